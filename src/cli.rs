use repet::io::format::{output_paths, write_separation, AudioFormat};
use repet::SeparationParams;
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let input = match parse_input(&args) {
        Ok(path) => path,
        Err(msg) => {
            eprintln!("ERROR: {}", msg);
            print_usage();
            std::process::exit(1);
        }
    };
    let input_path = Path::new(input);

    // Reject unknown extensions before touching the file
    let format = match AudioFormat::from_path(input_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let signal = match format.decode_file(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR: Failed to read {}: {}", input_path.display(), e);
            std::process::exit(1);
        }
    };

    eprintln!(
        "Input: {} frames, {} Hz, {} channel(s), {:.2}s",
        signal.num_frames(),
        signal.sample_rate,
        signal.channels,
        signal.duration_secs()
    );

    let params = SeparationParams::default();
    let result = match repet::separate(&signal, &params) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR: Separation failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = write_separation(input_path, &result) {
        eprintln!("ERROR: Failed to write outputs: {}", e);
        std::process::exit(1);
    }

    match output_paths(input_path) {
        Ok((bg, fg)) => {
            eprintln!("Background written to {}", bg.display());
            eprintln!("Foreground written to {}", fg.display());
        }
        Err(_) => unreachable!("format was validated above"),
    }
}

/// The only accepted invocation is a single positional input path.
fn parse_input(args: &[String]) -> Result<&str, String> {
    if args.len() < 2 {
        return Err("missing input file".to_string());
    }
    if args.len() > 2 {
        return Err(format!("unexpected argument '{}'", args[2]));
    }
    Ok(&args[1])
}

fn print_usage() {
    eprintln!("Usage: repet <input.wav|input.mp3>");
    eprintln!();
    eprintln!("Writes the repeating background to <input>_1.<ext> and the");
    eprintln!("non-repeating foreground to <input>_2.<ext>.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_input_single_path() {
        let args = args(&["repet", "mix.wav"]);
        let parsed = parse_input(&args);
        assert_eq!(parsed, Ok("mix.wav"));
    }

    #[test]
    fn test_parse_input_rejects_missing_path() {
        assert!(parse_input(&args(&["repet"])).is_err());
    }

    #[test]
    fn test_parse_input_rejects_extra_arguments() {
        let err = parse_input(&args(&["repet", "mix.wav", "--tolerance"])).unwrap_err();
        assert!(err.contains("--tolerance"));
        assert!(parse_input(&args(&["repet", "a.wav", "b.wav"])).is_err());
    }
}
