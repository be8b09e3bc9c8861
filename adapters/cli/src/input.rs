use std::{error::Error, fmt, time::Duration};

use rescue_grid_core::{Ability, CellCoord, Command, ObstacleId, RemovalMethod, SurvivorId};
use serde::{de::IntoDeserializer, Deserialize};

/// Usage summary printed by `help`.
pub(crate) const HELP: &str = "\
commands:
  start | pause | resume | end | turn
  select <survivor>
  move <survivor> <column> <row>
  remove <obstacle> <method> <survivor>...
  ability <survivor> bridge <column> <row>
  ability <survivor> heal|cure <target>
  ability <survivor> food|energy|immunity
  ability <survivor> scout <column> <row>
  wait <seconds> | show | help | quit";

/// One parsed line of user input.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Input {
    /// Command forwarded to the session.
    Command(Command),
    /// Lets real time elapse.
    Wait(Duration),
    /// Prints the level state.
    Show,
    /// Prints the usage summary.
    Help,
    /// Leaves the program.
    Quit,
}

/// Parses a single line of user input.
pub(crate) fn parse(line: &str) -> Result<Input, InputError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(InputError::Empty);
    };
    let args: Vec<&str> = words.collect();

    let input = match (verb, args.as_slice()) {
        ("start", []) => Input::Command(Command::Start),
        ("pause", []) => Input::Command(Command::Pause),
        ("resume", []) => Input::Command(Command::Resume),
        ("end", []) => Input::Command(Command::EndPlanning),
        ("turn", []) => Input::Command(Command::AdvanceTurn),
        ("show", []) => Input::Show,
        ("help", []) => Input::Help,
        ("quit" | "exit", []) => Input::Quit,
        ("wait", [seconds]) => Input::Wait(Duration::from_secs(number(seconds)?.into())),
        ("select", [survivor]) => Input::Command(Command::SelectSurvivor {
            survivor: SurvivorId::new(number(survivor)?),
        }),
        ("move", [survivor, column, row]) => Input::Command(Command::MoveSurvivor {
            survivor: SurvivorId::new(number(survivor)?),
            to: cell(column, row)?,
        }),
        ("remove", [obstacle, method, survivors @ ..]) => Input::Command(Command::RemoveObstacle {
            obstacle: ObstacleId::new(number(obstacle)?),
            method: removal_method(method)?,
            survivors: survivors
                .iter()
                .map(|survivor| number(survivor).map(SurvivorId::new))
                .collect::<Result<_, _>>()?,
        }),
        ("ability", [survivor, name, rest @ ..]) => Input::Command(Command::UseAbility {
            survivor: SurvivorId::new(number(survivor)?),
            ability: ability(name, rest)?,
        }),
        _ => return Err(InputError::UnknownCommand(line.trim().to_owned())),
    };
    Ok(input)
}

fn ability(name: &str, args: &[&str]) -> Result<Ability, InputError> {
    let ability = match (name, args) {
        ("bridge", [column, row]) => Ability::BuildBridge {
            target: cell(column, row)?,
        },
        ("heal", [target]) => Ability::Heal {
            target: SurvivorId::new(number(target)?),
        },
        ("cure", [target]) => Ability::Cure {
            target: SurvivorId::new(number(target)?),
        },
        ("food", []) => Ability::ProduceFood,
        ("energy", []) => Ability::RestoreTeamEnergy,
        ("immunity", []) => Ability::Immunity,
        ("scout", [column, row]) => Ability::Scout {
            target: cell(column, row)?,
        },
        _ => return Err(InputError::UnknownAbility(name.to_owned())),
    };
    Ok(ability)
}

fn removal_method(name: &str) -> Result<RemovalMethod, InputError> {
    let deserializer: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
        name.into_deserializer();
    RemovalMethod::deserialize(deserializer)
        .map_err(|_| InputError::UnknownMethod(name.to_owned()))
}

fn cell(column: &str, row: &str) -> Result<CellCoord, InputError> {
    Ok(CellCoord::new(number(column)?, number(row)?))
}

fn number(value: &str) -> Result<u32, InputError> {
    value
        .parse()
        .map_err(|_| InputError::InvalidNumber(value.to_owned()))
}

/// Errors that can occur while parsing user input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum InputError {
    /// The line contained only whitespace.
    Empty,
    /// The verb or its arguments were not recognised.
    UnknownCommand(String),
    /// The ability name or its arguments were not recognised.
    UnknownAbility(String),
    /// The removal method name was not recognised.
    UnknownMethod(String),
    /// An argument was not a non-negative integer.
    InvalidNumber(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty input"),
            Self::UnknownCommand(line) => write!(f, "unrecognised command `{line}`"),
            Self::UnknownAbility(name) => write!(f, "unrecognised ability `{name}`"),
            Self::UnknownMethod(name) => write!(f, "unknown removal method `{name}`"),
            Self::InvalidNumber(value) => write!(f, "`{value}` is not a number"),
        }
    }
}

impl Error for InputError {}
