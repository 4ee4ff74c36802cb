//! Typed parsers for raw attribute-value text, built on [`Scanner`].
//!
//! Each parser consumes the whole input; trailing garbage after a valid
//! value is a scan error, so a malformed attribute never half-applies.

use kurbo::{BezPath, Point};

use crate::{
    error::{StrataError, StrataResult},
    model::{Color, DisplayMode, FillRule, LineCap, LineJoin, Paint, TransformOp, ViewBox},
    scanner::{CharacterSet, ScanError, Scanner},
};

fn id_characters() -> CharacterSet {
    CharacterSet::new(
        "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-_.:",
    )
}

fn finish(scanner: &mut Scanner) -> Result<(), ScanError> {
    if scanner.is_exhausted() {
        Ok(())
    } else {
        Err(ScanError::Mismatch {
            expected: "end of input".to_string(),
        })
    }
}

/// True once only whitespace and list separators remain.
fn at_list_end(scanner: &mut Scanner) -> bool {
    let _ = scanner.scan(&CharacterSet::whitespace_or_comma());
    scanner.is_exhausted()
}

pub fn parse_points(text: &str) -> Result<Vec<Point>, ScanError> {
    let mut scanner = Scanner::new(text);
    let mut points = Vec::new();
    loop {
        match scanner.scan_coordinate() {
            Ok(x) => {
                let y = scanner.scan_coordinate()?;
                points.push(Point::new(x, y));
            }
            Err(ScanError::UnexpectedEof) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(points)
}

pub fn parse_transform_list(text: &str) -> Result<Vec<TransformOp>, ScanError> {
    let mut scanner = Scanner::new(text);
    let mut ops = Vec::new();
    while !at_list_end(&mut scanner) {
        ops.push(scan_transform(&mut scanner)?);
    }
    Ok(ops)
}

fn scan_transform(scanner: &mut Scanner) -> Result<TransformOp, ScanError> {
    if scanner.scan_string("matrix").is_ok() {
        scanner.scan_string("(")?;
        let a = scanner.scan_coordinate()?;
        let b = scanner.scan_coordinate()?;
        let c = scanner.scan_coordinate()?;
        let d = scanner.scan_coordinate()?;
        let e = scanner.scan_coordinate()?;
        let f = scanner.scan_coordinate()?;
        scanner.scan_string(")")?;
        return Ok(TransformOp::Matrix { a, b, c, d, e, f });
    }
    if scanner.scan_string("translate").is_ok() {
        scanner.scan_string("(")?;
        let tx = scanner.scan_coordinate()?;
        let ty = scanner.scan_coordinate().unwrap_or(0.0);
        scanner.scan_string(")")?;
        return Ok(TransformOp::Translate { tx, ty });
    }
    if scanner.scan_string("scale").is_ok() {
        scanner.scan_string("(")?;
        let sx = scanner.scan_coordinate()?;
        let sy = scanner.scan_coordinate().unwrap_or(sx);
        scanner.scan_string(")")?;
        return Ok(TransformOp::Scale { sx, sy });
    }
    if scanner.scan_string("rotate").is_ok() {
        scanner.scan_string("(")?;
        let angle = scanner.scan_coordinate()?;
        let op = if let Ok(cx) = scanner.scan_coordinate() {
            let cy = scanner.scan_coordinate()?;
            TransformOp::RotatePoint { angle, cx, cy }
        } else {
            TransformOp::Rotate { angle }
        };
        scanner.scan_string(")")?;
        return Ok(op);
    }
    if scanner.scan_string("skewX").is_ok() {
        scanner.scan_string("(")?;
        let angle = scanner.scan_coordinate()?;
        scanner.scan_string(")")?;
        return Ok(TransformOp::SkewX { angle });
    }
    if scanner.scan_string("skewY").is_ok() {
        scanner.scan_string("(")?;
        let angle = scanner.scan_coordinate()?;
        scanner.scan_string(")")?;
        return Ok(TransformOp::SkewY { angle });
    }
    Err(ScanError::Mismatch {
        expected: "transform function".to_string(),
    })
}

pub fn parse_color(text: &str) -> Result<Color, ScanError> {
    let mut scanner = Scanner::new(text);
    let color = scan_color(&mut scanner)?;
    finish(&mut scanner)?;
    Ok(color)
}

fn scan_color(scanner: &mut Scanner) -> Result<Color, ScanError> {
    if scanner.scan_string("none").is_ok() {
        return Ok(Color::None);
    }
    let keywords = [
        ("black", Color::Rgb(0, 0, 0)),
        ("white", Color::Rgb(255, 255, 255)),
        ("red", Color::Rgb(255, 0, 0)),
        ("green", Color::Rgb(0, 128, 0)),
        ("blue", Color::Rgb(0, 0, 255)),
    ];
    for (keyword, color) in keywords {
        if scanner.scan_string(keyword).is_ok() {
            return Ok(color);
        }
    }
    if scanner.scan_string("#").is_ok() {
        let digits = scanner
            .scan(&CharacterSet::hexadecimal())
            .ok_or(ScanError::MalformedNumber)?;
        return match digits.len() {
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).unwrap_or(0);
                Ok(Color::Rgb(nibble(0) * 17, nibble(1) * 17, nibble(2) * 17))
            }
            6 => {
                let byte = |i: usize| {
                    u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ScanError::MalformedNumber)
                };
                Ok(Color::Rgb(byte(0)?, byte(2)?, byte(4)?))
            }
            _ => Err(ScanError::MalformedNumber),
        };
    }
    if scanner.scan_string("rgb(").is_ok() {
        let r = scanner.scan_uint8()?;
        let _ = scanner.scan_string(",");
        let g = scanner.scan_uint8()?;
        let _ = scanner.scan_string(",");
        let b = scanner.scan_uint8()?;
        scanner.scan_string(")")?;
        return Ok(Color::Rgb(r, g, b));
    }
    Err(ScanError::Mismatch {
        expected: "color".to_string(),
    })
}

pub fn parse_paint(text: &str) -> Result<Paint, ScanError> {
    let mut scanner = Scanner::new(text);
    if scanner.scan_string("url(").is_ok() {
        scanner.scan_string("#")?;
        let id = scanner
            .scan(&id_characters())
            .ok_or_else(|| ScanError::Mismatch {
                expected: "fragment id".to_string(),
            })?;
        scanner.scan_string(")")?;
        finish(&mut scanner)?;
        return Ok(Paint::Reference(id.to_string()));
    }
    let color = scan_color(&mut scanner)?;
    finish(&mut scanner)?;
    Ok(Paint::Color(color))
}

pub fn parse_dash_array(text: &str) -> Result<Vec<f32>, ScanError> {
    let mut scanner = Scanner::new(text);
    let mut dashes = Vec::new();
    loop {
        match scanner.scan_coordinate() {
            Ok(value) if value >= 0.0 => dashes.push(value as f32),
            Ok(_) => return Err(ScanError::MalformedNumber),
            Err(ScanError::UnexpectedEof) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(dashes)
}

pub fn parse_opacity(text: &str) -> Result<f32, ScanError> {
    let mut scanner = Scanner::new(text);
    let value = scanner.scan_percentage()?;
    finish(&mut scanner)?;
    Ok(value)
}

pub fn parse_display(text: &str) -> Result<DisplayMode, ScanError> {
    parse_keyword(text, &[("inline", DisplayMode::Inline), ("none", DisplayMode::None)])
}

pub fn parse_fill_rule(text: &str) -> Result<FillRule, ScanError> {
    parse_keyword(
        text,
        &[("nonzero", FillRule::NonZero), ("evenodd", FillRule::EvenOdd)],
    )
}

pub fn parse_line_cap(text: &str) -> Result<LineCap, ScanError> {
    parse_keyword(
        text,
        &[
            ("butt", LineCap::Butt),
            ("round", LineCap::Round),
            ("square", LineCap::Square),
        ],
    )
}

pub fn parse_line_join(text: &str) -> Result<LineJoin, ScanError> {
    parse_keyword(
        text,
        &[
            ("miter", LineJoin::Miter),
            ("round", LineJoin::Round),
            ("bevel", LineJoin::Bevel),
        ],
    )
}

fn parse_keyword<T: Copy>(text: &str, alternatives: &[(&str, T)]) -> Result<T, ScanError> {
    let mut scanner = Scanner::new(text);
    for (keyword, value) in alternatives {
        if scanner.scan_string(keyword).is_ok() {
            finish(&mut scanner)?;
            return Ok(*value);
        }
    }
    Err(ScanError::Mismatch {
        expected: "keyword".to_string(),
    })
}

pub fn parse_view_box(text: &str) -> Result<ViewBox, ScanError> {
    let mut scanner = Scanner::new(text);
    let x = scanner.scan_coordinate()?;
    let y = scanner.scan_coordinate()?;
    let width = scanner.scan_coordinate()?;
    let height = scanner.scan_coordinate()?;
    finish(&mut scanner)?;
    Ok(ViewBox {
        x,
        y,
        width,
        height,
    })
}

pub fn parse_path_data(d: &str) -> StrataResult<BezPath> {
    let d = d.trim();
    if d.is_empty() {
        return Err(StrataError::validation("path data must be non-empty"));
    }
    BezPath::from_svg(d).map_err(|e| StrataError::validation(format!("invalid path data: {e}")))
}
