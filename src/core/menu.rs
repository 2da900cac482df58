//! # Option Menu
//!
//! Shows the numbered list of options and reads the user's choice. Invalid input
//! is answered with a message and the menu is shown again; this is a plain input
//! loop and has nothing to do with error recovery.
use crate::models::OptionDef;
use dialoguer::{Input, theme::ColorfulTheme};
use std::io::{BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Terminal Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("User Interface Error: {0}")]
    Dialoguer(#[from] dialoguer::Error),
    #[error("Input ended before a valid option was chosen.")]
    InputClosed,
    #[error("There are no options to choose from.")]
    NoOptions,
    #[error("Option '{0}' not found.")]
    UnknownOption(String),
}

/// Line-based conversation with the user.
pub trait Prompt {
    /// Shows one line of text.
    fn show(&mut self, line: &str) -> Result<(), MenuError>;

    /// Asks for one line of input. `Ok(None)` means the input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, MenuError>;
}

/// Interactive prompt on a real terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TermPrompt;

impl Prompt for TermPrompt {
    fn show(&mut self, line: &str) -> Result<(), MenuError> {
        println!("{}", line);
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, MenuError> {
        let line: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(Some(line))
    }
}

/// Prompt over arbitrary streams (piped stdin, tests).
#[derive(Debug)]
pub struct StreamPrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StreamPrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Gives back the writer, e.g. to inspect what was shown.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> Prompt for StreamPrompt<R, W> {
    fn show(&mut self, line: &str) -> Result<(), MenuError> {
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, MenuError> {
        write!(self.writer, "{}: ", prompt)?;
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Shows the menu until a valid option is chosen and returns it.
pub fn choose<'o, P: Prompt + ?Sized>(
    options: &'o [OptionDef],
    prompt: &mut P,
) -> Result<&'o OptionDef, MenuError> {
    if options.is_empty() {
        return Err(MenuError::NoOptions);
    }

    loop {
        for (key, option) in options.iter().enumerate() {
            prompt.show(&format!("{}: {}", key + 1, option.name))?;
        }

        let line = prompt
            .read_line(t!("menu.prompt"))?
            .ok_or(MenuError::InputClosed)?;

        if let Some(option) = parse_choice(&line, options.len()).and_then(|i| options.get(i)) {
            log::debug!("Option '{}' chosen", option.name);
            return Ok(option);
        }

        log::debug!("Rejected menu input {:?}", line);
        prompt.show(t!("menu.error.invalid_choice"))?;
        prompt.show("")?;
    }
}

/// Maps a line typed by the user to a 0-based index into a list of `count` options.
///
/// The line (without its terminator) must consist of ASCII digits only and name
/// a 1-based position inside the list.
pub fn parse_choice(line: &str, count: usize) -> Option<usize> {
    let digits = line.trim_end_matches(['\r', '\n']);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number: usize = digits.parse().ok()?;
    number.checked_sub(1).filter(|&index| index < count)
}

/// Picks an option without asking: by exact name first, then by 1-based number.
pub fn select_by_key<'o>(options: &'o [OptionDef], key: &str) -> Result<&'o OptionDef, MenuError> {
    options
        .iter()
        .find(|option| option.name == key)
        .or_else(|| parse_choice(key, options.len()).and_then(|i| options.get(i)))
        .ok_or_else(|| MenuError::UnknownOption(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(names: &[&str]) -> Vec<OptionDef> {
        names
            .iter()
            .map(|name| OptionDef {
                name: name.to_string(),
                actions: Vec::new(),
                backup: None,
            })
            .collect()
    }

    /// Runs the menu over `input` and returns the chosen name plus everything shown.
    fn run_menu(names: &[&str], input: &str) -> (Result<String, MenuError>, String) {
        let opts = options(names);
        let mut prompt = StreamPrompt::new(input.as_bytes(), Vec::new());
        let chosen = choose(&opts, &mut prompt).map(|o| o.name.clone());
        let shown = String::from_utf8(prompt.into_writer()).unwrap();
        (chosen, shown)
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1\n", 3), Some(0));
        assert_eq!(parse_choice("3\r\n", 3), Some(2));
        assert_eq!(parse_choice("0", 3), None);
        assert_eq!(parse_choice("-1", 3), None);
        assert_eq!(parse_choice("abc", 3), None);
        assert_eq!(parse_choice("4", 3), None);
        assert_eq!(parse_choice("", 3), None);
        assert_eq!(parse_choice(" 1", 3), None);
        assert_eq!(parse_choice("+1", 3), None);
        assert_eq!(parse_choice("99999999999999999999999999", 3), None);
    }

    #[test]
    fn test_valid_choice_returns_option() {
        let (chosen, shown) = run_menu(&["USB Disk", "NAS"], "2\n");
        assert_eq!(chosen.unwrap(), "NAS");
        assert!(shown.starts_with("1: USB Disk\n2: NAS\n"));
        assert!(!shown.contains(t!("menu.error.invalid_choice")));
    }

    #[test]
    fn test_invalid_inputs_re_prompt() {
        let (chosen, shown) = run_menu(&["USB Disk", "NAS"], "0\n-1\nabc\n3\n1\n");
        assert_eq!(chosen.unwrap(), "USB Disk");
        assert_eq!(shown.matches(t!("menu.error.invalid_choice")).count(), 4);
        // The menu is shown once per attempt.
        assert_eq!(shown.matches("2: NAS").count(), 5);
    }

    #[test]
    fn test_end_of_input_aborts() {
        let (chosen, _) = run_menu(&["USB Disk"], "7\n");
        assert!(matches!(chosen, Err(MenuError::InputClosed)));
    }

    #[test]
    fn test_no_options() {
        let (chosen, _) = run_menu(&[], "1\n");
        assert!(matches!(chosen, Err(MenuError::NoOptions)));
    }

    #[test]
    fn test_select_by_key() {
        let opts = options(&["USB Disk", "NAS", "2"]);
        assert_eq!(select_by_key(&opts, "NAS").unwrap().name, "NAS");
        // An exact name match wins over the numeric reading.
        assert_eq!(select_by_key(&opts, "2").unwrap().name, "2");
        assert_eq!(select_by_key(&opts, "1").unwrap().name, "USB Disk");
        assert!(matches!(
            select_by_key(&opts, "4"),
            Err(MenuError::UnknownOption(ref k)) if k == "4"
        ));
    }
}
