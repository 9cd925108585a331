use thiserror::Error;

use crate::row::Row;

// Non-SQL statements like .exit are called “meta-commands”.
#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    Unrecognized,
}

impl MetaCommand {
    fn parse(input: &str) -> Option<MetaCommand> {
        match input {
            ".exit" => Some(MetaCommand::Exit),
            _ if input.starts_with('.') => Some(MetaCommand::Unrecognized),
            _ => None,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PrepareError {
    #[error("ID must be positive.")]
    NegativeId,

    #[error("Syntax error. Could not parse statement.")]
    SyntaxError,

    #[error("Unrecognized command")]
    Unrecognized,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

impl Statement {
    pub fn prepare(input: &str) -> Result<Statement, PrepareError> {
        let mut tokens = input.split_whitespace();
        match tokens.next() {
            Some("insert") => Self::prepare_insert(tokens),
            Some("select") => Ok(Statement::Select),
            _ => Err(PrepareError::Unrecognized),
        }
    }

    // Trailing tokens after the email are ignored.
    fn prepare_insert<'a>(
        mut args: impl Iterator<Item = &'a str>,
    ) -> Result<Statement, PrepareError> {
        let (Some(id), Some(username), Some(email)) = (args.next(), args.next(), args.next())
        else {
            return Err(PrepareError::SyntaxError);
        };

        let id: i64 = id.parse().map_err(|_| PrepareError::SyntaxError)?;
        if id < 0 {
            return Err(PrepareError::NegativeId);
        }
        let id = u32::try_from(id).map_err(|_| PrepareError::SyntaxError)?;

        Ok(Statement::Insert(Row::new(id, username, email)))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum InputType {
    Meta(MetaCommand),
    Statement(Result<Statement, PrepareError>),
}

impl InputType {
    pub fn parse(input: &str) -> InputType {
        if let Some(meta) = MetaCommand::parse(input) {
            InputType::Meta(meta)
        } else {
            InputType::Statement(Statement::prepare(input))
        }
    }
}
