//! The line-oriented intent scripts the driver plays back.
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! place 1.5
//! date 1969-07-20
//! tick 1d 2h 30m 4.5s
//! toggle orbit        # or size, paths
//! select Mars
//! observer 0.1 0 -0.3
//! pinch 0.5 keep
//! reset
//! clear
//! report
//! dump
//! ```

use color_eyre::eyre::{self, eyre};
use nalgebra::Vector3;
use orrery::time::SimDate;
use time::{Duration, Month};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Toggle {
    Orbit,
    Size,
    Paths,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Place(f64),
    Date(SimDate),
    Tick(Duration),
    Toggle(Toggle),
    Select(String),
    Observer(Vector3<f64>),
    Pinch { factor: f64, keep: bool },
    Reset,
    Clear,
    Report,
    Dump,
}

/// Parse a whole script into `(line number, command)` pairs, skipping blank
/// and comment lines.
pub fn parse_script(source: &str) -> eyre::Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (i, line) in source.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let (_, command) =
            parse::command(line).map_err(|err| eyre!("line {}: cannot parse {line:?}: {err}", i + 1))?;
        commands.push((i + 1, command));
    }
    Ok(commands)
}

fn calendar_date(year: i32, month: u8, day: u8) -> Option<SimDate> {
    SimDate::from_calendar_date(year, Month::try_from(month).ok()?, day)
}

#[allow(clippy::cast_precision_loss)]
mod parse {
    use nom::branch::alt;
    use nom::bytes::complete::{tag, take_while1};
    use nom::character::complete::{char, i32, space0, space1, u64, u8};
    use nom::combinator::{eof, map, map_opt, opt, value};
    use nom::number::complete::double;
    use nom::sequence::{pair, preceded, terminated, tuple};
    use nom::IResult;
    use time::Duration;

    use super::{calendar_date, Command, Toggle};

    /// `[-]Nd Nh Nmin|Nm N[.N]s`, every part optional.
    pub fn parse_dhms_duration(input: &str, allow_neg: bool) -> IResult<&str, Duration> {
        if input.is_empty() {
            return Err(nom::Err::Failure(nom::error::make_error(
                input,
                nom::error::ErrorKind::Eof,
            )));
        }

        let (input, neg) = if allow_neg {
            opt(tag("-"))(input)?
        } else {
            (input, None)
        };
        let (input, days) = opt(terminated(u64, pair(tag("d"), space0)))(input)?;
        let (input, hours) = opt(terminated(u64, pair(tag("h"), space0)))(input)?;
        let (input, mins) = opt(terminated(u64, pair(alt((tag("min"), tag("m"))), space0)))(input)?;
        let (input, seconds) = opt(terminated(double, pair(tag("s"), space0)))(input)?;
        let (input, _) = eof(input)?;

        let seconds = neg.map_or(1.0, |_| -1.0)
            * (days.unwrap_or(0) as f64 * 60.0 * 60.0 * 24.0
                + hours.unwrap_or(0) as f64 * 60.0 * 60.0
                + mins.unwrap_or(0) as f64 * 60.0
                + seconds.unwrap_or(0.0));
        let duration = Duration::checked_seconds_f64(seconds).ok_or_else(|| {
            nom::Err::Failure(nom::error::make_error(input, nom::error::ErrorKind::TooLarge))
        })?;
        Ok((input, duration))
    }

    fn wall_time(input: &str) -> IResult<&str, Duration> {
        parse_dhms_duration(input, false)
    }

    fn date(input: &str) -> IResult<&str, (i32, u8, u8)> {
        let (input, year) = i32(input)?;
        let (input, _) = char('-')(input)?;
        let (input, month) = u8(input)?;
        let (input, _) = char('-')(input)?;
        let (input, day) = u8(input)?;
        Ok((input, (year, month, day)))
    }

    fn word(input: &str) -> IResult<&str, &str> {
        take_while1(|c: char| !c.is_whitespace())(input)
    }

    fn keyword<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, ()> {
        value((), pair(tag(name), space1))
    }

    fn toggle(input: &str) -> IResult<&str, Toggle> {
        alt((
            value(Toggle::Orbit, tag("orbit")),
            value(Toggle::Size, tag("size")),
            value(Toggle::Paths, tag("paths")),
        ))(input)
    }

    fn observer(input: &str) -> IResult<&str, Command> {
        let (input, (x, _, y, _, z)) = tuple((double, space1, double, space1, double))(input)?;
        Ok((input, Command::Observer([x, y, z].into())))
    }

    fn pinch(input: &str) -> IResult<&str, Command> {
        let (input, factor) = double(input)?;
        let (input, keep) = opt(preceded(space1, tag("keep")))(input)?;
        Ok((
            input,
            Command::Pinch {
                factor,
                keep: keep.is_some(),
            },
        ))
    }

    pub fn command(input: &str) -> IResult<&str, Command> {
        let (input, command) = alt((
            preceded(keyword("place"), map(double, Command::Place)),
            preceded(
                keyword("date"),
                map_opt(date, |(y, m, d)| calendar_date(y, m, d).map(Command::Date)),
            ),
            preceded(keyword("tick"), map(wall_time, Command::Tick)),
            preceded(keyword("toggle"), map(toggle, Command::Toggle)),
            preceded(keyword("select"), map(word, |name| Command::Select(name.to_owned()))),
            preceded(keyword("observer"), observer),
            preceded(keyword("pinch"), pinch),
            value(Command::Reset, tag("reset")),
            value(Command::Clear, tag("clear")),
            value(Command::Report, tag("report")),
            value(Command::Dump, tag("dump")),
        ))(input)?;
        let (input, _) = pair(space0, eof)(input)?;
        Ok((input, command))
    }
}

#[cfg(test)]
mod tests {
    use super::parse::parse_dhms_duration;
    use super::*;

    fn one(line: &str) -> Command {
        let mut commands = parse_script(line).unwrap();
        assert_eq!(commands.len(), 1);
        commands.remove(0).1
    }

    #[test]
    fn durations() {
        assert_eq!(parse_dhms_duration("1d 2h 3m 4s", false).unwrap().1, Duration::seconds(93_784));
        assert_eq!(parse_dhms_duration("90s", false).unwrap().1, Duration::seconds(90));
        assert_eq!(
            parse_dhms_duration("4.5s", false).unwrap().1,
            Duration::milliseconds(4500)
        );
        assert_eq!(parse_dhms_duration("2min", false).unwrap().1, Duration::minutes(2));
        assert_eq!(parse_dhms_duration("-1h", true).unwrap().1, Duration::hours(-1));
        assert!(parse_dhms_duration("-1h", false).is_err());
        assert!(parse_dhms_duration("", false).is_err());
        assert!(parse_dhms_duration("3 parsecs", false).is_err());
    }

    #[test]
    fn oversized_durations_fail_to_parse() {
        assert!(matches!(
            parse_dhms_duration("99999999999999999d", false),
            Err(nom::Err::Failure(_))
        ));
        let err = parse_script("place 1\ntick 99999999999999999d\n").unwrap_err();
        assert!(err.to_string().starts_with("line 2:"), "{err}");
        // Long but representable spans still parse; the engine decides
        assert_eq!(one("tick 99999d"), Command::Tick(Duration::days(99_999)));
    }

    #[test]
    fn commands() {
        assert_eq!(one("place 1.5"), Command::Place(1.5));
        assert_eq!(one("tick 30s"), Command::Tick(Duration::seconds(30)));
        assert_eq!(one("toggle size"), Command::Toggle(Toggle::Size));
        assert_eq!(one("select Mars"), Command::Select("Mars".to_owned()));
        assert_eq!(
            one("observer 0.5 -1 2"),
            Command::Observer(Vector3::new(0.5, -1.0, 2.0))
        );
        assert_eq!(
            one("pinch 0.5 keep"),
            Command::Pinch {
                factor: 0.5,
                keep: true
            }
        );
        assert_eq!(
            one("pinch 2"),
            Command::Pinch {
                factor: 2.0,
                keep: false
            }
        );
        assert_eq!(one("report"), Command::Report);
        assert_eq!(
            one("date 1969-07-20"),
            Command::Date(SimDate::from_calendar_date(1969, Month::July, 20).unwrap())
        );
    }

    #[test]
    fn comments_and_blank_lines() {
        let script = parse_script("# intro\n\nplace 2 # metres\n   \nreset\n").unwrap();
        assert_eq!(script, [(3, Command::Place(2.0)), (5, Command::Reset)]);
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse_script("place 1\ntoggle everything\n").unwrap_err();
        assert!(err.to_string().starts_with("line 2:"), "{err}");
        assert!(parse_script("date 2023-02-30").is_err());
        assert!(parse_script("resetting").is_err());
    }
}
