/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Quit,
    /// 1-based index into the propulsion options currently shown.
    Select(usize),
    Say(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if matches!(line, "quit" | "exit" | "/quit") {
            return Self::Quit;
        }
        if let Some(rest) = line
            .strip_prefix("select ")
            .or_else(|| line.strip_prefix("/select "))
        {
            if let Ok(index) = rest.trim().parse::<usize>() {
                return Self::Select(index);
            }
        }
        Self::Say(line.to_string())
    }
}
