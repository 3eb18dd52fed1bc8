use colored::Colorize;
use std::io::{self, BufRead, Write};

use crate::error::{MonitorError, Result};
use crate::models::system::SortBy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    SystemInfo,
    LiveMonitor,
    Issues,
    TopProcesses,
    Report,
    Graphs,
    MonitorProcess,
    Connections,
    DiskIo,
}

const OPTIONS: [(MenuChoice, &str); 10] = [
    (MenuChoice::SystemInfo, "Show System Information"),
    (MenuChoice::LiveMonitor, "Monitor Resources in Real-time"),
    (MenuChoice::Issues, "Check System Issues"),
    (MenuChoice::TopProcesses, "View Top Processes"),
    (MenuChoice::Report, "Generate Complete Report"),
    (MenuChoice::Graphs, "Resource Usage Graphs"),
    (MenuChoice::MonitorProcess, "Monitor Selected Process"),
    (MenuChoice::Connections, "Network Connections"),
    (MenuChoice::DiskIo, "Disk I/O Statistics"),
    (MenuChoice::Exit, "Exit"),
];

impl MenuChoice {
    pub fn key(&self) -> char {
        match self {
            MenuChoice::Exit => '0',
            MenuChoice::SystemInfo => '1',
            MenuChoice::LiveMonitor => '2',
            MenuChoice::Issues => '3',
            MenuChoice::TopProcesses => '4',
            MenuChoice::Report => '5',
            MenuChoice::Graphs => '6',
            MenuChoice::MonitorProcess => '7',
            MenuChoice::Connections => '8',
            MenuChoice::DiskIo => '9',
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let mut chars = input.trim().chars();
        let key = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        OPTIONS
            .iter()
            .map(|(choice, _)| *choice)
            .find(|choice| choice.key() == key)
    }
}

pub fn show_menu() {
    println!("\n{}", "OPTIONS:".bold());
    for (choice, label) in OPTIONS {
        println!("{}. {}", choice.key(), label);
    }
}

/// Prints `message` and reads one line from stdin, without the line ending.
///
/// `None` at end of input.
pub fn prompt(message: &str) -> io::Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

pub fn pause(message: &str) -> io::Result<()> {
    prompt(message).map(|_| ())
}

/// "2" picks memory; anything else sorts by CPU.
pub fn parse_sort(input: &str) -> SortBy {
    if input.trim() == "2" {
        SortBy::Memory
    } else {
        SortBy::Cpu
    }
}

pub fn parse_pid(input: &str) -> Result<u32> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|_| MonitorError::invalid_pid(input.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(MenuChoice::parse("0"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse(" 5\n"), Some(MenuChoice::Report));
        assert_eq!(MenuChoice::parse("9"), Some(MenuChoice::DiskIo));
        assert_eq!(MenuChoice::parse("10"), None);
        assert_eq!(MenuChoice::parse("x"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }

    #[test]
    fn test_every_key_round_trips() {
        for (choice, _) in OPTIONS {
            assert_eq!(MenuChoice::parse(&choice.key().to_string()), Some(choice));
        }
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("2"), SortBy::Memory);
        assert_eq!(parse_sort("1"), SortBy::Cpu);
        assert_eq!(parse_sort(""), SortBy::Cpu);
    }

    #[test]
    fn test_parse_pid() {
        assert_eq!(parse_pid(" 1234 ").unwrap(), 1234);
        assert!(matches!(parse_pid("abc"), Err(MonitorError::InvalidPid(_))));
        assert!(parse_pid("-1").is_err());
    }
}
