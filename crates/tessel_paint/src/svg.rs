//! SVG path data (`d` attribute) parsing
//!
//! Parsing happens in two steps: the string is split into commands with their
//! numeric arguments (repeated argument groups expanded into repeated commands),
//! then the commands are replayed onto a `GraphicsPath` in absolute coordinates.

use crate::error::{PathError, Result};
use crate::path::GraphicsPath;
use smallvec::SmallVec;

/// A parsed command letter with exactly one group of arguments
#[derive(Clone, Debug, PartialEq)]
pub struct SvgCommand {
    pub command: char,
    pub args: SmallVec<[f32; 7]>,
}

fn arity(command: char) -> Option<usize> {
    match command.to_ascii_lowercase() {
        'a' => Some(7),
        'c' => Some(6),
        'h' | 'v' => Some(1),
        'l' | 'm' | 't' => Some(2),
        'q' | 's' => Some(4),
        'z' => Some(0),
        _ => None,
    }
}

fn is_separator(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C | b',')
}

struct Cursor<'a> {
    data: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            data,
            bytes: data.as_bytes(),
            pos: 0,
        }
    }

    fn skip_separators(&mut self) {
        while self.pos < self.bytes.len() && is_separator(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn unexpected(&self) -> PathError {
        let found = self.data[self.pos..].chars().next().unwrap_or('\0');
        PathError::UnexpectedCharacter {
            found,
            offset: self.pos,
        }
    }

    fn starts_number(&self) -> bool {
        matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'-' | b'+'))
    }

    fn number(&mut self) -> Result<f32> {
        let start = self.pos;
        let mut digits = 0;

        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
            digits += 1;
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            while let Some(b'0'..=b'9') = self.peek() {
                self.pos += 1;
                digits += 1;
            }
        }
        if digits == 0 {
            return Err(PathError::InvalidNumber { offset: start });
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'-' | b'+')) {
                self.pos += 1;
            }
            let exp_start = self.pos;
            while let Some(b'0'..=b'9') = self.peek() {
                self.pos += 1;
            }
            if self.pos == exp_start {
                // Not an exponent after all
                self.pos = mark;
            }
        }

        self.data[start..self.pos]
            .parse::<f32>()
            .map_err(|_| PathError::InvalidNumber { offset: start })
    }

    fn flag(&mut self) -> Result<f32> {
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                Ok(0.0)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(1.0)
            }
            Some(_) => Err(self.unexpected()),
            None => Err(PathError::InvalidNumber { offset: self.pos }),
        }
    }
}

/// Split path data into single-group commands
///
/// Extra coordinate pairs after a moveto become linetos. A command whose
/// argument count is not a multiple of its arity is an error.
pub fn parse_path_data(data: &str) -> Result<Vec<SvgCommand>> {
    let mut cursor = Cursor::new(data);
    let mut commands = Vec::new();

    cursor.skip_separators();
    while let Some(b) = cursor.peek() {
        let letter = b as char;
        let Some(expected) = arity(letter).filter(|_| b.is_ascii_alphabetic()) else {
            return Err(cursor.unexpected());
        };
        if commands.is_empty() && !matches!(letter, 'M' | 'm') {
            return Err(PathError::MissingMoveTo);
        }
        cursor.pos += 1;

        let mut args: Vec<f32> = Vec::new();
        let args_start = cursor.pos;
        loop {
            cursor.skip_separators();
            let is_flag = expected == 7 && matches!(args.len() % 7, 3 | 4);
            if is_flag {
                if !matches!(cursor.peek(), Some(b'0' | b'1')) {
                    break;
                }
                args.push(cursor.flag()?);
            } else if cursor.starts_number() {
                args.push(cursor.number()?);
            } else {
                break;
            }
        }

        if expected == 0 {
            if !args.is_empty() {
                cursor.pos = args_start;
                cursor.skip_separators();
                return Err(cursor.unexpected());
            }
            commands.push(SvgCommand {
                command: letter,
                args: SmallVec::new(),
            });
            continue;
        }

        if args.is_empty() || args.len() % expected != 0 {
            return Err(PathError::MissingArguments {
                command: letter,
                expected,
                found: args.len(),
            });
        }

        for (i, group) in args.chunks_exact(expected).enumerate() {
            let command = match letter {
                'M' if i > 0 => 'L',
                'm' if i > 0 => 'l',
                other => other,
            };
            commands.push(SvgCommand {
                command,
                args: SmallVec::from_slice(group),
            });
        }
    }

    Ok(commands)
}

/// Parse `data` and append its instructions to `path`
pub(crate) fn parse_into(data: &str, path: &mut GraphicsPath) -> Result<()> {
    let commands = parse_path_data(data)?;
    let mut replay = Replay::new(path);
    for command in &commands {
        replay.apply(command);
    }
    Ok(())
}

struct Replay<'a> {
    path: &'a mut GraphicsPath,
    x: f32,
    y: f32,
    start_x: f32,
    start_y: f32,
    /// A closepath ran and no moveto followed yet
    reopen: bool,
}

impl<'a> Replay<'a> {
    fn new(path: &'a mut GraphicsPath) -> Self {
        Self {
            path,
            x: 0.0,
            y: 0.0,
            start_x: 0.0,
            start_y: 0.0,
            reopen: false,
        }
    }

    fn apply(&mut self, cmd: &SvgCommand) {
        let a = &cmd.args;
        let relative = cmd.command.is_ascii_lowercase();
        let (ox, oy) = if relative { (self.x, self.y) } else { (0.0, 0.0) };

        let letter = cmd.command.to_ascii_uppercase();
        if letter != 'M' && letter != 'Z' && self.reopen {
            // Drawing after a closepath continues from the subpath start
            self.path.move_to(self.start_x, self.start_y);
        }
        self.reopen = false;

        match letter {
            'M' => {
                self.x = a[0] + ox;
                self.y = a[1] + oy;
                self.start_x = self.x;
                self.start_y = self.y;
                self.path.move_to(self.x, self.y);
            }
            'L' => {
                self.x = a[0] + ox;
                self.y = a[1] + oy;
                self.path.line_to(self.x, self.y);
            }
            'H' => {
                self.x = a[0] + ox;
                self.path.line_to(self.x, self.y);
            }
            'V' => {
                self.y = a[0] + oy;
                self.path.line_to(self.x, self.y);
            }
            'C' => {
                self.path.bezier_curve_to(
                    a[0] + ox,
                    a[1] + oy,
                    a[2] + ox,
                    a[3] + oy,
                    a[4] + ox,
                    a[5] + oy,
                    None,
                );
                self.x = a[4] + ox;
                self.y = a[5] + oy;
            }
            'S' => {
                self.path
                    .bezier_curve_to_short(a[0] + ox, a[1] + oy, a[2] + ox, a[3] + oy, None);
                self.x = a[2] + ox;
                self.y = a[3] + oy;
            }
            'Q' => {
                self.path
                    .quadratic_curve_to(a[0] + ox, a[1] + oy, a[2] + ox, a[3] + oy, None);
                self.x = a[2] + ox;
                self.y = a[3] + oy;
            }
            'T' => {
                self.x = a[0] + ox;
                self.y = a[1] + oy;
                self.path.quadratic_curve_to_short(self.x, self.y, None);
            }
            'A' => {
                self.x = a[5] + ox;
                self.y = a[6] + oy;
                self.path
                    .arc_to_svg(a[0], a[1], a[2], a[3] != 0.0, a[4] != 0.0, self.x, self.y);
            }
            'Z' => {
                self.path.close_path();
                self.x = self.start_x;
                self.y = self.start_y;
                self.reopen = true;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathInstruction;
    use tessel_core::Point;

    #[test]
    fn test_parse_implicit_lineto_after_moveto() {
        let cmds = parse_path_data("M 0 0 10 0 10 10").unwrap();
        let letters: String = cmds.iter().map(|c| c.command).collect();
        assert_eq!(letters, "MLL");

        let cmds = parse_path_data("m1,1 2,2").unwrap();
        assert_eq!(cmds[1].command, 'l');
    }

    #[test]
    fn test_parse_compact_numbers_and_flags() {
        let cmds = parse_path_data("M0,0a1 1 0 014 4l-1.5.5e1-2 3").unwrap();
        assert_eq!(cmds[1].command, 'a');
        assert_eq!(cmds[1].args.as_slice(), &[1.0, 1.0, 0.0, 0.0, 1.0, 4.0, 4.0]);
        assert_eq!(cmds[2].args.as_slice(), &[-1.5, 5.0]);
        assert_eq!(cmds[3].args.as_slice(), &[-2.0, 3.0]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_path_data("M 0 0 L 5"),
            Err(PathError::MissingArguments {
                command: 'L',
                expected: 2,
                found: 1
            })
        );
        assert_eq!(parse_path_data("L 0 0"), Err(PathError::MissingMoveTo));
        assert_eq!(
            parse_path_data("M 0 0 X"),
            Err(PathError::UnexpectedCharacter {
                found: 'X',
                offset: 6
            })
        );
        assert!(matches!(
            parse_path_data("M 0 0 L - 4"),
            Err(PathError::InvalidNumber { offset: 8 })
        ));
        assert!(parse_path_data("M 0 0 Z 4").is_err());
        assert_eq!(parse_path_data("   ").unwrap(), vec![]);
    }

    #[test]
    fn test_relative_commands_resolve_to_absolute() {
        let path = GraphicsPath::from_svg("m10 10 h5 v5 l-5 0 z").unwrap();
        assert_eq!(
            path.instructions(),
            &[
                PathInstruction::MoveTo(Point::new(10.0, 10.0)),
                PathInstruction::LineTo(Point::new(15.0, 10.0)),
                PathInstruction::LineTo(Point::new(15.0, 15.0)),
                PathInstruction::LineTo(Point::new(10.0, 15.0)),
                PathInstruction::ClosePath,
            ]
        );
    }

    #[test]
    fn test_drawing_after_close_restarts_at_subpath_start() {
        let path = GraphicsPath::from_svg("M0 0 L10 0 L10 10 Z l5 5").unwrap();
        let tail = &path.instructions()[4..];
        assert_eq!(
            tail,
            &[
                PathInstruction::MoveTo(Point::new(0.0, 0.0)),
                PathInstruction::LineTo(Point::new(5.0, 5.0)),
            ]
        );
    }

    #[test]
    fn test_smooth_curves_reflect() {
        let path = GraphicsPath::from_svg("M0 0 C0 10 10 10 10 0 S20 -10 20 0").unwrap();
        match &path.instructions()[2] {
            PathInstruction::BezierCurveTo { cp1, end, .. } => {
                assert_eq!(*cp1, Point::new(10.0, -10.0));
                assert_eq!(*end, Point::new(20.0, 0.0));
            }
            other => panic!("unexpected {other:?}"),
        }

        let path = GraphicsPath::from_svg("M0 0 Q5 5 10 0 T20 0").unwrap();
        match &path.instructions()[2] {
            PathInstruction::QuadraticCurveTo { cp, .. } => assert_eq!(*cp, Point::new(15.0, -5.0)),
            other => panic!("unexpected {other:?}"),
        }
    }
}
