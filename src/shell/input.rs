//! Line-based prompts for the interactive shell.
//!
//! `Console` owns the input and output streams. Every prompt flushes before
//! reading, and end of input surfaces as [`ShellError::Closed`].

use std::io::{BufRead, Write};

use crate::shell::colors::{self, paint};
use crate::shell::menu::ShellError;

/// Prompting wrapper around a reader and a writer.
pub struct Console<R, W> {
    input: R,
    pub out: W,
    color: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W, color: bool) -> Self {
        Console { input, out, color }
    }

    /// Ask a free-text question. Surrounding whitespace is kept except the line ending.
    pub fn ask(&mut self, prompt: &str) -> Result<String, ShellError> {
        write!(self.out, "{prompt}: ")?;
        self.read_line()
    }

    /// Ask with a default used when the answer is blank.
    pub fn ask_default(&mut self, prompt: &str, default: &str) -> Result<String, ShellError> {
        write!(self.out, "{prompt} ({default}): ")?;
        let answer = self.read_line()?;
        if answer.trim().is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }

    /// Ask until the answer is one of `choices`. A blank answer picks `default`.
    pub fn choose<S: AsRef<str>>(
        &mut self,
        prompt: &str,
        choices: &[S],
        default: Option<&str>,
    ) -> Result<String, ShellError> {
        let options: Vec<&str> = choices.iter().map(|c| c.as_ref()).collect();
        let listed = options.join("/");
        loop {
            match default {
                Some(d) => write!(self.out, "{prompt} [{listed}] ({d}): ")?,
                None => write!(self.out, "{prompt} [{listed}]: ")?,
            }
            let answer = self.read_line()?;
            let answer = answer.trim();
            if answer.is_empty() {
                if let Some(d) = default {
                    return Ok(d.to_string());
                }
            }
            if let Some(hit) = options.iter().find(|c| c.eq_ignore_ascii_case(answer)) {
                return Ok(hit.to_string());
            }
            let msg = paint("Please select one of the available options", colors::DANGER, self.color);
            writeln!(self.out, "{msg}")?;
        }
    }

    /// Ask a yes/no question until answered.
    pub fn confirm(&mut self, prompt: &str) -> Result<bool, ShellError> {
        loop {
            write!(self.out, "{prompt} [y/n]: ")?;
            match self.read_line()?.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => {
                    let msg = paint("Please enter Y or N", colors::DANGER, self.color);
                    writeln!(self.out, "{msg}")?;
                }
            }
        }
    }

    /// Ask for a number. `Ok(None)` means the answer was not a number.
    pub fn ask_number(&mut self, prompt: &str) -> Result<Option<u64>, ShellError> {
        Ok(self.ask(prompt)?.trim().parse().ok())
    }

    fn read_line(&mut self) -> Result<String, ShellError> {
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ShellError::Closed);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), false)
    }

    #[test]
    fn test_choose_reprompts_until_valid() {
        let mut c = console("x\nN\n");
        let answer = c.choose("Select", &["n", "e"], None).unwrap();
        assert_eq!(answer, "n");
        let out = String::from_utf8(c.out).unwrap();
        assert!(out.contains("Please select one of the available options"));
    }

    #[test]
    fn test_choose_blank_takes_default() {
        let mut c = console("\n");
        assert_eq!(c.choose("Select", &["n", "e"], Some("n")).unwrap(), "n");
    }

    #[test]
    fn test_ask_default_keeps_default_on_blank() {
        let mut c = console("  \nnew value\r\n");
        assert_eq!(c.ask_default("Title", "old").unwrap(), "old");
        assert_eq!(c.ask_default("Title", "old").unwrap(), "new value");
    }

    #[test]
    fn test_confirm_and_eof() {
        let mut c = console("maybe\nyes\n");
        assert!(c.confirm("Sure?").unwrap());
        assert!(matches!(c.confirm("Again?"), Err(ShellError::Closed)));
    }

    #[test]
    fn test_ask_number() {
        let mut c = console("12\nabc\n");
        assert_eq!(c.ask_number("ID").unwrap(), Some(12));
        assert_eq!(c.ask_number("ID").unwrap(), None);
    }
}
