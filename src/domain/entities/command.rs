/// How a command's trigger is compared against message text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The whole text must equal the trigger
    Exact(&'static str),
    /// The text must start with the trigger; the remainder is the argument string
    Prefix(&'static str),
}

impl Trigger {
    /// Returns the argument remainder when the text matches
    pub fn matches<'a>(&self, text: &'a str) -> Option<&'a str> {
        match self {
            Trigger::Exact(t) => (text == *t).then_some(""),
            Trigger::Prefix(p) => text.strip_prefix(p),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Exact(t) | Trigger::Prefix(t) => t,
        }
    }
}

/// Static description of a command, used for matching and help output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub trigger: Trigger,
    pub usage: &'static str,
}

impl CommandSpec {
    pub const fn exact(trigger: &'static str) -> Self {
        Self {
            trigger: Trigger::Exact(trigger),
            usage: trigger,
        }
    }

    pub const fn prefix(trigger: &'static str, usage: &'static str) -> Self {
        Self {
            trigger: Trigger::Prefix(trigger),
            usage,
        }
    }
}

/// First space-separated token of an argument string, if non-empty.
///
/// `"!download  x"` has an empty first token and therefore no argument.
pub fn first_token(args: &str) -> Option<&str> {
    args.split(' ').next().filter(|t| !t.is_empty())
}
