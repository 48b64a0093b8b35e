use crate::error::InputError;
use crate::models::Vehicle;
use crate::TicketId;
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag_no_case},
    character::complete::{space0, space1},
    character::streaming::{line_ending, not_line_ending},
    combinator::{all_consuming, map, value},
    sequence::{delimited, pair, preceded, separated_pair, terminated},
    IResult,
};

/// A validated request from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Park(Vehicle),
    Exit(TicketId),
    Status,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command<'a> {
    Park(&'a str, &'a str),
    Exit(&'a str),
    Status,
    Quit,
}

const KEYWORDS: [&str; 4] = ["PARK", "EXIT", "STATUS", "QUIT"];

/// Ticket ids are positive integers; `0` is never issued.
pub fn parse_ticket_id(input: &str) -> Result<TicketId, InputError> {
    let trimmed = input.trim();
    match trimmed.parse::<TicketId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(InputError::InvalidTicketId(trimmed.to_owned())),
    }
}

fn nom_token(input: &str) -> IResult<&str, &str> {
    is_not(" \t")(input)
}

fn nom_park(input: &str) -> IResult<&str, Command> {
    map(
        preceded(pair(tag_no_case("PARK"), space1), separated_pair(nom_token, space1, nom_token)),
        |(plate, category)| Command::Park(plate, category),
    )(input)
}

fn nom_exit(input: &str) -> IResult<&str, Command> {
    map(preceded(pair(tag_no_case("EXIT"), space1), nom_token), Command::Exit)(input)
}

fn nom_status(input: &str) -> IResult<&str, Command> {
    value(Command::Status, tag_no_case("STATUS"))(input)
}

fn nom_quit(input: &str) -> IResult<&str, Command> {
    value(Command::Quit, tag_no_case("QUIT"))(input)
}

fn nom_command(input: &str) -> IResult<&str, Command> {
    all_consuming(delimited(space0, alt((nom_park, nom_exit, nom_status, nom_quit)), space0))(input)
}

fn nom_line(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(not_line_ending, line_ending)(input)
}

/// Parses one complete line (without its terminator) into a request.
pub fn parse_request(line: &str) -> Result<Request, InputError> {
    match nom_command(line) {
        Ok((_, Command::Park(plate, category))) => Ok(Request::Park(Vehicle::parse(plate, category)?)),
        Ok((_, Command::Exit(ticket))) => Ok(Request::Exit(parse_ticket_id(ticket)?)),
        Ok((_, Command::Status)) => Ok(Request::Status),
        Ok((_, Command::Quit)) => Ok(Request::Quit),
        Err(_) => {
            // Tell a known command with the wrong arguments apart from an unknown one.
            let keyword = line.split_whitespace().next().unwrap_or_default();
            if keyword.is_empty() || KEYWORDS.iter().any(|known| known.eq_ignore_ascii_case(keyword)) {
                Err(InputError::Malformed)
            } else {
                Err(InputError::UnknownCommand(keyword.to_owned()))
            }
        },
    }
}

type InputBufferMatch = Option<(Result<Request, InputError>, usize)>;

/// Pulls the next line off the front of `input`.
///
/// `None` means no full line has arrived yet. Otherwise the parse outcome is returned together
/// with the number of bytes to drain; a bad line is consumed like a good one so the client can
/// carry on.
pub(crate) fn nom(input: &[u8]) -> InputBufferMatch {
    match nom_line(input) {
        Ok((remainder, line)) => {
            let outcome = match std::str::from_utf8(line) {
                Ok(line) => parse_request(line),
                Err(_) => Err(InputError::Malformed),
            };
            Some((outcome, input.len() - remainder.len()))
        },
        // `not_line_ending` also stops at a lone `\r`, which `line_ending` then rejects.
        Err(nom::Err::Error(_) | nom::Err::Failure(_)) => match input.iter().position(|&byte| byte == common::ASCII_NEWLINE) {
            Some(position) => Some((Err(InputError::Malformed), position + 1)),
            None => None,
        },
        Err(nom::Err::Incomplete(_)) => None,
    }
}
