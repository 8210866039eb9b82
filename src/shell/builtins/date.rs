//! `date [-s "HH:MM:SS DD.MM.YYYY"] [-a N]` — show or set the shell clock,
//! and set an alarm offset (§6). No `chrono`-style dependency is pulled in
//! for this: the calendar/epoch conversion is the well-known
//! days-since-epoch algorithm (Hinnant's `civil_from_days`/`days_from_civil`),
//! small enough to keep in-house.

use crate::argparser::{self, check_help, Descriptor};
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};

const USAGE: &str = "Usage: date [-s \"HH:MM:SS DD.MM.YYYY\"] [-a SECONDS]\r\n  -s          set the current time\r\n  -a          set an alarm SECONDS from now";
const MICROS_PER_SEC: i64 = 1_000_000;
const SECS_PER_DAY: i64 = 86_400;

#[derive(Default)]
struct Args {
    set: Option<String>,
    alarm: Option<i64>,
}

fn descriptors() -> Vec<Descriptor<Args>> {
    vec![
        Descriptor {
            name: Some("-s"),
            metavar: Some("TIME"),
            info: "set the current time",
            count: 1,
            setter: |a, v| a.set = v.map(str::to_string),
        },
        Descriptor {
            name: Some("-a"),
            metavar: Some("SECONDS"),
            info: "set an alarm SECONDS from now",
            count: 1,
            setter: |a, v| a.alarm = v.and_then(|v| v.parse().ok()),
        },
    ]
}

/// Days since the epoch for a given civil date, per Hinnant's `days_from_civil`.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as i64;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`]: `(year, month, day)` for a given days-since-epoch.
fn civil_from_days(z: i64) -> (i64, i64, i64) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { y + 1 } else { y };
    (year, month, day)
}

fn format_micros(micros: i64) -> String {
    let total_secs = micros.div_euclid(MICROS_PER_SEC);
    let days = total_secs.div_euclid(SECS_PER_DAY);
    let secs_of_day = total_secs.rem_euclid(SECS_PER_DAY);
    let (year, month, day) = civil_from_days(days);
    let hour = secs_of_day / 3600;
    let minute = (secs_of_day % 3600) / 60;
    let second = secs_of_day % 60;
    format!("{hour:02}:{minute:02}:{second:02} {day:02}.{month:02}.{year:04}")
}

fn parse_micros(text: &str) -> Result<i64> {
    let (time_part, date_part) = text.split_once(' ').ok_or(Error::Invalid)?;
    let mut time_fields = time_part.splitn(3, ':');
    let hour: i64 = time_fields.next().ok_or(Error::Invalid)?.parse().map_err(|_| Error::Invalid)?;
    let minute: i64 = time_fields.next().ok_or(Error::Invalid)?.parse().map_err(|_| Error::Invalid)?;
    let second: i64 = time_fields.next().ok_or(Error::Invalid)?.parse().map_err(|_| Error::Invalid)?;

    let mut date_fields = date_part.splitn(3, '.');
    let day: i64 = date_fields.next().ok_or(Error::Invalid)?.parse().map_err(|_| Error::Invalid)?;
    let month: i64 = date_fields.next().ok_or(Error::Invalid)?.parse().map_err(|_| Error::Invalid)?;
    let year: i64 = date_fields.next().ok_or(Error::Invalid)?.parse().map_err(|_| Error::Invalid)?;

    let days = days_from_civil(year, month, day);
    let secs = days * SECS_PER_DAY + hour * 3600 + minute * 60 + second;
    Ok(secs * MICROS_PER_SEC)
}

pub fn run(ctx: &ShellContext, term: &SharedTerminal, raw_args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(raw_args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let args: Vec<String> = raw_args.to_vec();
    let parsed = argparser::parse(&args, &descriptors());

    if let Some(alarm_secs) = parsed.alarm {
        let at = ctx.clock.now_micros() + alarm_secs * MICROS_PER_SEC;
        ctx.env.borrow_mut().get_or_insert("ALARM").set(at.to_string().as_bytes());
        return Ok(());
    }

    if let Some(spec) = &parsed.set {
        let micros = parse_micros(spec)?;
        ctx.clock.set_micros(micros)?;
        return Ok(());
    }

    let mut t = term.borrow_mut();
    t.insert_str(&format_micros(ctx.clock.now_micros()));
    t.insert_eol();
    Ok(())
}
