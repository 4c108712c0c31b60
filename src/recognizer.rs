use std::collections::HashMap;

use crate::config::{ConfigError, FunctionNames};
use crate::logging;
use crate::token::{Token, TokenKind};

/// Shape of a translation function call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionRole {
    /// `gettext(msgid)`
    Plain,
    /// `ngettext(msgid, msgid_plural, n)`
    Plural,
    /// `pgettext(msgctxt, msgid)`
    Context,
    /// `npgettext(msgctxt, msgid, msgid_plural, n)`
    PluralContext,
}

impl FunctionRole {
    /// Number of literal arguments that complete a call of this role
    fn arity(self) -> usize {
        match self {
            FunctionRole::Plain => 1,
            FunctionRole::Plural | FunctionRole::Context => 2,
            FunctionRole::PluralContext => 3,
        }
    }

    fn config_key(self) -> &'static str {
        match self {
            FunctionRole::Plain => "plain",
            FunctionRole::Plural => "plural",
            FunctionRole::Context => "context",
            FunctionRole::PluralContext => "pluralContext",
        }
    }
}

/// Lookup table from function name to its role.
///
/// Every name maps to exactly one role; ambiguous configurations are
/// rejected when the table is built.
#[derive(Debug, Clone, Default)]
pub struct FunctionRoles {
    roles: HashMap<String, FunctionRole>,
}

impl FunctionRoles {
    pub fn from_names(names: &FunctionNames) -> Result<Self, ConfigError> {
        let mut table = Self::default();
        let lists = [
            (FunctionRole::Plain, &names.plain),
            (FunctionRole::Plural, &names.plural),
            (FunctionRole::Context, &names.context),
            (FunctionRole::PluralContext, &names.plural_context),
        ];
        for (role, list) in lists {
            for name in list {
                table.insert(name, role)?;
            }
        }
        Ok(table)
    }

    fn insert(&mut self, name: &str, role: FunctionRole) -> Result<(), ConfigError> {
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyFunctionName {
                list: role.config_key(),
            });
        }
        match self.roles.get(name) {
            Some(existing) if *existing == role => Ok(()),
            Some(existing) => Err(ConfigError::AmbiguousFunctionName {
                name: name.to_string(),
                first: existing.config_key(),
                second: role.config_key(),
            }),
            None => {
                self.roles.insert(name.to_string(), role);
                Ok(())
            }
        }
    }

    pub fn role_of(&self, name: &str) -> Option<FunctionRole> {
        self.roles.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// One fully recognized translation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedUnit {
    pub msgid: String,
    /// Empty when the call carries no context
    pub msgctxt: String,
    pub msgid_plural: Option<String>,
    pub line: usize,
}

impl ExtractedUnit {
    pub fn new(msgid: impl Into<String>, line: usize) -> Self {
        Self {
            msgid: msgid.into(),
            msgctxt: String::new(),
            msgid_plural: None,
            line,
        }
    }

    pub fn with_context(mut self, msgctxt: impl Into<String>) -> Self {
        self.msgctxt = msgctxt.into();
        self
    }

    pub fn with_plural(mut self, msgid_plural: impl Into<String>) -> Self {
        self.msgid_plural = Some(msgid_plural.into());
        self
    }
}

/// Arguments collected so far for a call being matched
#[derive(Debug)]
struct CallArgs {
    role: FunctionRole,
    closed: Vec<String>,
    /// Literal text since the last boundary; `None` until a literal shows up
    buffer: Option<String>,
    /// Line of the boundary that closed the first argument
    line: Option<usize>,
}

impl CallArgs {
    fn new(role: FunctionRole) -> Self {
        Self {
            role,
            closed: Vec::with_capacity(role.arity()),
            buffer: None,
            line: None,
        }
    }

    fn into_unit(self) -> Option<ExtractedUnit> {
        let line = self.line?;
        let mut args = self.closed.into_iter();
        let unit = match self.role {
            FunctionRole::Plain => ExtractedUnit::new(args.next()?, line),
            FunctionRole::Plural => {
                let msgid = args.next()?;
                ExtractedUnit::new(msgid, line).with_plural(args.next()?)
            }
            FunctionRole::Context => {
                let msgctxt = args.next()?;
                ExtractedUnit::new(args.next()?, line).with_context(msgctxt)
            }
            FunctionRole::PluralContext => {
                let msgctxt = args.next()?;
                let msgid = args.next()?;
                ExtractedUnit::new(msgid, line)
                    .with_context(msgctxt)
                    .with_plural(args.next()?)
            }
        };
        Some(unit)
    }
}

#[derive(Debug)]
enum State {
    Idle,
    AwaitingParen(FunctionRole),
    CollectingArgs(CallArgs),
}

/// Single-pass recognizer over a token stream.
///
/// Partial matches are dropped silently: a call is only reported once all
/// of its literal arguments have been closed by a boundary token.
pub struct Recognizer<'r> {
    roles: &'r FunctionRoles,
    state: State,
}

impl<'r> Recognizer<'r> {
    pub fn new(roles: &'r FunctionRoles) -> Self {
        Self {
            roles,
            state: State::Idle,
        }
    }

    /// Advance the machine by one token, returning a unit when a call completes.
    pub fn feed(&mut self, token: &Token<'_>) -> Option<ExtractedUnit> {
        let state = std::mem::replace(&mut self.state, State::Idle);
        let (next, unit) = self.step(state, token);
        self.state = next;
        unit
    }

    fn step(&self, state: State, token: &Token<'_>) -> (State, Option<ExtractedUnit>) {
        match state {
            State::Idle => match token.kind {
                TokenKind::Word(name) => match self.roles.role_of(name) {
                    Some(role) => (State::AwaitingParen(role), None),
                    None => (State::Idle, None),
                },
                _ => (State::Idle, None),
            },
            State::AwaitingParen(role) => match token.kind {
                TokenKind::OpenParen => (State::CollectingArgs(CallArgs::new(role)), None),
                _ => (State::Idle, None),
            },
            State::CollectingArgs(args) => Self::collect(args, token),
        }
    }

    fn collect(mut args: CallArgs, token: &Token<'_>) -> (State, Option<ExtractedUnit>) {
        match &token.kind {
            TokenKind::Literal(Some(value)) => {
                args.buffer.get_or_insert_with(String::new).push_str(value);
                (State::CollectingArgs(args), None)
            }
            TokenKind::Literal(None) => {
                logging::debug(format_args!(
                    "line {}: abandoning call, literal is not valid Unicode",
                    token.line
                ));
                (State::Idle, None)
            }
            TokenKind::Plus => (State::CollectingArgs(args), None),
            // non-literal argument, cannot be extracted statically
            TokenKind::Word(_) => (State::Idle, None),
            TokenKind::OpenParen | TokenKind::Other => {
                let Some(argument) = args.buffer.take() else {
                    return (State::Idle, None);
                };
                args.line.get_or_insert(token.line);
                args.closed.push(argument);
                if args.closed.len() == args.role.arity() {
                    (State::Idle, args.into_unit())
                } else {
                    (State::CollectingArgs(args), None)
                }
            }
        }
    }
}

/// Recognize every translation call in `tokens`.
pub fn recognize(tokens: &[Token<'_>], roles: &FunctionRoles) -> Vec<ExtractedUnit> {
    let mut recognizer = Recognizer::new(roles);
    tokens
        .iter()
        .filter_map(|token| recognizer.feed(token))
        .collect()
}
