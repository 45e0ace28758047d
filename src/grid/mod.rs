pub mod config;

use std::str::FromStr;

use config::GridSpec;

use crate::error::InputError;

/// Shape of the marks printed along a grid edge. Squares count cells in
/// the positive direction, circles in the negative one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkShape {
    Square,
    Circle,
}

impl FromStr for MarkShape {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "square" => Ok(MarkShape::Square),
            "circle" => Ok(MarkShape::Circle),
            _ => Err(InputError::UnknownShape(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSelection {
    pub x_marks: u8,
    pub x_shape: MarkShape,
    pub y_marks: u8,
    pub y_shape: MarkShape,
    pub delta_x_um: i32,
    pub delta_y_um: i32,
}

/// `<x marks> <x shape> <y marks> <y shape> <dx µm> <dy µm>`
impl FromStr for GridSelection {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [x_marks, x_shape, y_marks, y_shape, dx, dy] = fields.as_slice() else {
            return Err(InputError::Malformed(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        };
        Ok(Self {
            x_marks: parse_number(x_marks)?,
            x_shape: x_shape.parse()?,
            y_marks: parse_number(y_marks)?,
            y_shape: y_shape.parse()?,
            delta_x_um: parse_number(dx)?,
            delta_y_um: parse_number(dy)?,
        })
    }
}

fn parse_number<T: FromStr>(field: &str) -> Result<T, InputError> {
    field
        .parse()
        .map_err(|_| InputError::Malformed(format!("not a number: {field}")))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTarget {
    pub row: i32,
    pub col: i32,
    pub x_mm: f64,
    pub y_mm: f64,
}

impl GridSpec {
    /// Resolves a selection to stage millimetres, rejecting anything that
    /// does not land in a cell on the disc.
    pub fn locate(&self, selection: &GridSelection) -> Result<GridTarget, InputError> {
        for count in [selection.x_marks, selection.y_marks] {
            if count == 0 || count > self.max_marks {
                return Err(InputError::MarkCountOutOfRange {
                    count,
                    max: self.max_marks,
                });
            }
        }

        let max_um = self.pitch_um() as i32;
        for delta_um in [selection.delta_x_um, selection.delta_y_um] {
            if !(0..=max_um).contains(&delta_um) {
                return Err(InputError::DeltaOutOfRange { delta_um, max_um });
            }
        }

        let col = signed_count(selection.x_marks, selection.x_shape);
        let row = signed_count(selection.y_marks, selection.y_shape);
        let (x_um, y_um) = (self.cell_corner_um(col), self.cell_corner_um(row));

        // the cell's lower-left corner must lie on the disc
        if x_um.powi(2) + y_um.powi(2) > self.disc_radius_um().powi(2) {
            return Err(InputError::OutsideDisc { row, col });
        }

        let (cx, cy) = self.disc_center_um;
        Ok(GridTarget {
            row,
            col,
            x_mm: (cx + x_um + f64::from(selection.delta_x_um)) / 1000.0,
            y_mm: (cy + y_um + f64::from(selection.delta_y_um)) / 1000.0,
        })
    }

    fn cell_corner_um(&self, index: i32) -> f64 {
        let cells = if index >= 0 { index - 1 } else { index };
        f64::from(cells) * self.pitch_um() + self.line_thickness_um / 2.0
    }
}

fn signed_count(marks: u8, shape: MarkShape) -> i32 {
    match shape {
        MarkShape::Square => i32::from(marks),
        MarkShape::Circle => -i32::from(marks),
    }
}
