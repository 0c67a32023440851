use std::str::FromStr;

/// Commands the shell implements itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `exit` / `logout`
    Exit,
    /// `pwd`
    Pwd,
    /// `cd [dir]`
    Cd,
    /// `ls [-la] [path]`
    Ls,
    /// `cat file...`
    Cat,
    /// `echo text...`
    Echo,
    /// `date`
    Date,
    /// `who`
    Who,
    /// `uname`
    Uname,
    /// `help`
    Help,
    /// `clear`
    Clear,
}

impl FromStr for Builtin {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(match name {
            "exit" | "logout" => Self::Exit,
            "pwd" => Self::Pwd,
            "cd" => Self::Cd,
            "ls" => Self::Ls,
            "cat" => Self::Cat,
            "echo" => Self::Echo,
            "date" => Self::Date,
            "who" => Self::Who,
            "uname" => Self::Uname,
            "help" => Self::Help,
            "clear" => Self::Clear,
            _ => return Err(()),
        })
    }
}

/// A whitespace-split command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// The first word.
    pub cmd: &'a str,
    /// Every word after the first.
    pub args: Vec<&'a str>,
}

impl<'a> CommandLine<'a> {
    /// Split `line` on runs of whitespace. Blank lines yield `None`.
    #[must_use]
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let cmd = words.next()?;
        Some(Self {
            cmd,
            args: words.collect(),
        })
    }
}

/// Options accepted by `ls`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LsFlags {
    /// `-l`: long format.
    pub long: bool,
    /// `-a`: include `.` and `..`.
    pub all: bool,
}

impl LsFlags {
    /// Split `ls` arguments into flags and the first operand.
    ///
    /// Flags may be given separately or combined (`-l -a`, `-la`). Unknown
    /// flag letters are ignored. Operands after the first are ignored.
    #[must_use]
    pub fn parse<'a>(args: &[&'a str]) -> (Self, Option<&'a str>) {
        let mut flags = Self::default();
        let mut operand = None;
        for arg in args {
            if let Some(letters) = arg.strip_prefix('-')
                && !letters.is_empty()
            {
                for letter in letters.chars() {
                    match letter {
                        'l' => flags.long = true,
                        'a' => flags.all = true,
                        _ => {}
                    }
                }
            } else if operand.is_none() {
                operand = Some(*arg);
            }
        }
        (flags, operand)
    }
}
