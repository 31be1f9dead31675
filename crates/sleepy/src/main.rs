//! Demo worker for batchmon: sleeps one second at a time, printing a line
//! per second so suspension and resumption are visible in the output.

use std::io::Write;
use std::thread;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sleepy", about = "Sleep for N seconds, reporting progress")]
struct Args {
    /// Number of one-second sleeps; zero or less finishes at once
    #[arg(allow_negative_numbers = true)]
    seconds: i64,
}

fn main() {
    let args = Args::parse();
    let pid = std::process::id();
    let mut out = std::io::stdout();

    for i in 1..=args.seconds {
        let _ = writeln!(out, "PID {pid}: Sleeping... ({i}/{})", args.seconds);
        let _ = out.flush();
        thread::sleep(Duration::from_secs(1));
    }

    let _ = writeln!(out, "PID {pid}: Done.");
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn requires_an_integer_count() {
        assert_eq!(Args::try_parse_from(["sleepy", "3"]).unwrap().seconds, 3);
        assert_eq!(Args::try_parse_from(["sleepy", "-2"]).unwrap().seconds, -2);
        assert!(Args::try_parse_from(["sleepy"]).is_err());
        assert!(Args::try_parse_from(["sleepy", "abc"]).is_err());
    }
}
