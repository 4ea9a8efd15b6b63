//! Line-oriented text streams for planned trajectories and routes, plus
//! the DXF front end.
//!
//! Two formats: the 5-column planner stream (`X Y Z V C`, meters) and the
//! 4-column topology-only stream (`X Y Z CORTAR`, meters or millimeters).
//! Blocks are separated by all-NaN rows; values are space-separated with
//! six decimals and an integer flag.

use crate::errors::RouteError;
use crate::float_types::{METER, Real};
use crate::planner::{CartSample, Flag, RawPoint, Trajectory};
use crate::topology::Route;
use std::fmt::Write as _;
use std::io::{self, Write};

#[cfg(feature = "dxf-io")]
pub mod dxf;

/// Format the planner stream.
pub fn trajectory_to_string(traj: &Trajectory) -> String {
    let mut out = String::from("X Y Z V C\n");
    for (bi, (samples, _)) in traj.blocks().enumerate() {
        if bi > 0 {
            out.push_str("NaN NaN NaN NaN NaN\n");
        }
        for s in samples {
            let _ = writeln!(
                out,
                "{:.6} {:.6} {:.6} {:.6} {}",
                s.x,
                s.y,
                s.z,
                s.v,
                s.flag.code()
            );
        }
    }
    out
}

/// Write the planner stream to any sink.
pub fn write_trajectory<W: Write>(traj: &Trajectory, out: &mut W) -> io::Result<()> {
    out.write_all(trajectory_to_string(traj).as_bytes())
}

/// Format the topology-only stream. Flag column: 1 = cut, 0 = keep. A
/// separator row follows every chain.
pub fn route_to_string(route: &Route, in_meters: bool) -> String {
    let factor = if in_meters { 1.0 / METER } else { 1.0 };
    let mut out = String::from("X Y Z CORTAR\n");
    for (groups, flag) in [(&route.cut, 1), (&route.nocut, 0)] {
        for group in groups {
            for chain in &group.contours {
                for c in &chain.0 {
                    let _ = writeln!(
                        out,
                        "{:.6} {:.6} {:.6} {}",
                        c.x * factor,
                        c.y * factor,
                        0.0,
                        flag
                    );
                }
                out.push_str("NaN NaN NaN NaN\n");
            }
        }
    }
    out
}

/// Write the topology-only stream to any sink.
pub fn write_route<W: Write>(route: &Route, out: &mut W, in_meters: bool) -> io::Result<()> {
    out.write_all(route_to_string(route, in_meters).as_bytes())
}

fn tokenize(line: &str) -> Vec<&str> {
    line.split([' ', '\t', ','])
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_columns(tokens: &[&str], line_no: usize) -> Result<Vec<Real>, RouteError> {
    tokens
        .iter()
        .map(|t| {
            t.parse::<Real>().map_err(|_| {
                RouteError::MalformedStream(format!("line {line_no}: bad number {t:?}"))
            })
        })
        .collect()
}

fn looks_like_header(line: &str) -> bool {
    line.chars()
        .any(|c| c.is_ascii_alphabetic() && !matches!(c, 'n' | 'N' | 'a' | 'A' | 'e' | 'E'))
        || line.to_ascii_uppercase().contains("X Y Z")
}

/// Parse a 5-column planner stream back into a trajectory.
///
/// Block boundaries come from the NaN rows; whether a block was a
/// transition is inferred from mixed flags, which is all the text format
/// can say.
pub fn parse_trajectory(text: &str) -> Result<Trajectory, RouteError> {
    let mut traj = Trajectory::default();
    let mut current: Vec<CartSample> = Vec::new();
    let close = |rows: &mut Vec<CartSample>, traj: &mut Trajectory| {
        if rows.is_empty() {
            return;
        }
        let transition = rows.windows(2).any(|w| w[0].flag != w[1].flag);
        traj.push_block(core::mem::take(rows), transition);
    };

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || (line_no == 0 && looks_like_header(line)) {
            continue;
        }
        let tokens = tokenize(line);
        let values = parse_columns(&tokens, line_no + 1)?;
        if values.iter().any(|v| v.is_nan()) {
            close(&mut current, &mut traj);
            continue;
        }
        if values.len() < 5 {
            return Err(RouteError::MalformedStream(format!(
                "line {}: expected 5 columns, got {}",
                line_no + 1,
                values.len()
            )));
        }
        let flag = Flag::from_raw(values[4] as i32).ok_or_else(|| {
            RouteError::MalformedStream(format!("line {}: bad flag {}", line_no + 1, values[4]))
        })?;
        current.push(CartSample {
            x: values[0],
            y: values[1],
            z: values[2],
            flag,
            v: values[3],
        });
    }
    close(&mut current, &mut traj);
    Ok(traj)
}

/// Parse a 4-or-more-column `X Y Z C` stream into raw planner groups,
/// splitting at NaN rows.
pub fn read_raw_groups(text: &str) -> Result<Vec<Vec<RawPoint>>, RouteError> {
    let mut groups = Vec::new();
    let mut current: Vec<RawPoint> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || (line_no == 0 && looks_like_header(line)) {
            continue;
        }
        let tokens = tokenize(line);
        let values = parse_columns(&tokens, line_no + 1)?;
        if values.iter().any(|v| v.is_nan()) {
            if !current.is_empty() {
                groups.push(core::mem::take(&mut current));
            }
            continue;
        }
        if values.len() < 4 {
            return Err(RouteError::MalformedStream(format!(
                "line {}: expected 4 columns, got {}",
                line_no + 1,
                values.len()
            )));
        }
        current.push(RawPoint::new(
            values[0],
            values[1],
            values[2],
            values[3] as i32,
        ));
    }
    if !current.is_empty() {
        groups.push(current);
    }
    Ok(groups)
}
