//! Confirmation prompts.

use std::io::{self, BufRead, Write};

/// Ask `question` on stdout and wait for a literal `yes` or `no` on stdin.
pub fn confirm(question: &str) -> io::Result<bool> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    confirm_with(question, &mut stdin.lock(), &mut stdout)
}

/// Any other answer repeats the prompt; end of input counts as `no`.
pub fn confirm_with<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    writeln!(out, "{question} [yes/no]?")?;
    loop {
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match line.trim_end_matches(['\r', '\n']) {
            "yes" => return Ok(true),
            "no" => return Ok(false),
            _ => writeln!(out, "Please answer 'yes' or 'no'.")?,
        }
    }
}
