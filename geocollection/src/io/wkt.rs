use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::collection::GeometryCollection;
use crate::config::ExportOptions;
use crate::error::GeometryError;
use crate::geometry::{Geom, Geometry};
use crate::impls::{CircularString, CompoundCurve, Curve, CurvePolygon, LineString, Polygon, Ring};
use crate::io::{format, MAX_NESTING_DEPTH};
use crate::point::Point;
use crate::wkb_type::{Dimensions, GeometryKind, WkbType};

impl GeometryCollection {
    /// Writes the collection as WKT with the shortest exact representation of the numbers.
    pub fn to_wkt(&self) -> String {
        self.to_wkt_with(&ExportOptions::default())
    }

    /// Writes the collection as WKT with the precision from the options.
    pub fn to_wkt_with(&self, options: &ExportOptions) -> String {
        let mut out = String::new();
        write_collection(&mut out, self, options.precision);
        out
    }

    /// Replaces the content of the collection with the parsed WKT.
    ///
    /// The text must describe a geometry of the same kind as the declared kind of the collection. The
    /// dimension tag of the collection replaces the declared dimensions, parts keep their own ones. If
    /// parsing fails, the collection is left empty with its declared type unchanged.
    pub fn from_wkt(&mut self, wkt: &str) -> Result<(), GeometryError> {
        let declared = self.wkb_type();
        let parsed = Geom::from_wkt(wkt).and_then(|geometry| match geometry {
            Geom::GeometryCollection(collection) if collection.wkb_type().kind == declared.kind => {
                Ok(collection)
            }
            other => Err(GeometryError::UnexpectedType {
                expected: declared,
                found: other.wkb_type(),
            }),
        });

        match parsed {
            Ok(collection) => {
                *self = collection;
                Ok(())
            }
            Err(err) => {
                log::debug!("Failed to parse WKT of {declared} collection: {err}");
                self.clear();
                Err(err)
            }
        }
    }
}

impl Geom {
    /// Writes the geometry as WKT with the precision from the options.
    pub fn to_wkt_with(&self, options: &ExportOptions) -> String {
        let mut out = String::new();
        write_tagged(&mut out, self, options.precision);
        out
    }

    /// Parses a geometry of any supported kind.
    ///
    /// Tags are case insensitive, dimension tags may be separated from the kind (`LINESTRING ZM`) or appended
    /// to it (`LineStringZM`). Without a dimension tag, the dimensions are inferred from the number of
    /// ordinates of the first coordinate.
    pub fn from_wkt(wkt: &str) -> Result<Self, GeometryError> {
        let mut parser = Parser::new(wkt)?;
        let geometry = parser.geometry(None)?;
        match parser.next() {
            None => Ok(geometry),
            Some((_, position)) => Err(GeometryError::wkt(
                position,
                "unexpected text after the geometry",
            )),
        }
    }
}

impl Display for Geom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_wkt_with(&ExportOptions::default()))
    }
}

impl Display for GeometryCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_wkt())
    }
}

impl FromStr for Geom {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wkt(s)
    }
}

/// Parses a collection of any collection kind.
impl FromStr for GeometryCollection {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Geom::from_wkt(s)? {
            Geom::GeometryCollection(collection) => Ok(collection),
            other => Err(GeometryError::UnexpectedType {
                expected: WkbType::flat(GeometryKind::GeometryCollection),
                found: other.wkb_type(),
            }),
        }
    }
}

fn write_tagged(out: &mut String, geometry: &Geom, precision: Option<usize>) {
    if let Geom::GeometryCollection(collection) = geometry {
        return write_collection(out, collection, precision);
    }

    out.push_str(&geometry.wkb_type().wkt_tag());
    out.push(' ');
    write_body(out, geometry, precision);
}

fn write_collection(out: &mut String, collection: &GeometryCollection, precision: Option<usize>) {
    out.push_str(&collection.wkb_type().wkt_tag());
    out.push(' ');
    if collection.num_geometries() == 0 {
        out.push_str("EMPTY");
        return;
    }

    let untagged = collection.wkb_type().kind.untagged_part();
    out.push('(');
    for (index, part) in collection.parts().iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        if Some(part.kind()) == untagged && part.dimensions() == collection.dimensions() {
            write_body(out, part, precision);
        } else {
            write_tagged(out, part, precision);
        }
    }
    out.push(')');
}

/// Writes the part after the tag.
fn write_body(out: &mut String, geometry: &Geom, precision: Option<usize>) {
    if geometry.is_empty() {
        out.push_str("EMPTY");
        return;
    }

    match geometry {
        Geom::Point(point) => {
            write_sequence(out, std::slice::from_ref(point), point.dimensions(), precision)
        }
        Geom::LineString(line) => {
            write_sequence(out, line.points(), line.dimensions(), precision)
        }
        Geom::CircularString(arcs) => {
            write_sequence(out, arcs.points(), arcs.dimensions(), precision)
        }
        Geom::CompoundCurve(compound) => {
            out.push('(');
            for (index, curve) in compound.curves().iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_curve(out, curve, precision);
            }
            out.push(')');
        }
        Geom::Polygon(polygon) => write_rings(out, polygon, precision, |out, ring, precision| {
            write_sequence(out, ring.points(), ring.dimensions(), precision)
        }),
        Geom::CurvePolygon(polygon) => write_rings(out, polygon, precision, write_curve),
        Geom::GeometryCollection(collection) => write_collection(out, collection, precision),
    }
}

/// Line strings inside compound curves and curve polygons have no tag.
fn write_curve(out: &mut String, curve: &Curve, precision: Option<usize>) {
    match curve {
        Curve::LineString(line) => write_sequence(out, line.points(), line.dimensions(), precision),
        other => write_tagged(out, &Geom::from(other.clone()), precision),
    }
}

fn write_rings<R: Ring>(
    out: &mut String,
    polygon: &Polygon<R>,
    precision: Option<usize>,
    write_ring: impl Fn(&mut String, &R, Option<usize>),
) {
    out.push('(');
    for (index, ring) in polygon.rings().iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        write_ring(out, ring, precision);
    }
    out.push(')');
}

fn write_sequence(
    out: &mut String,
    points: &[Point],
    dimensions: Dimensions,
    precision: Option<usize>,
) {
    out.push('(');
    out.push_str(&format::sequence(
        points,
        dimensions.has_z(),
        dimensions.has_m(),
        " ",
        ", ",
        precision,
    ));
    out.push(')');
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Number(f64),
    Open,
    Close,
    Comma,
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, GeometryError> {
    let mut tokens = vec![];
    let mut chars = text.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' | ',' => {
                chars.next();
                let token = match c {
                    '(' => Token::Open,
                    ')' => Token::Close,
                    _ => Token::Comma,
                };
                tokens.push((token, position));
            }
            c if c.is_ascii_alphabetic() => {
                let mut end = position;
                while let Some(&(i, c)) = chars.peek() {
                    if !c.is_ascii_alphabetic() {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                tokens.push((Token::Word(text[position..end].to_string()), position));
            }
            c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => {
                let mut end = position;
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')) {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let literal = &text[position..end];
                let value = literal.parse::<f64>().map_err(|_| {
                    GeometryError::wkt(position, format!("invalid number '{literal}'"))
                })?;
                tokens.push((Token::Number(value), position));
            }
            other => {
                return Err(GeometryError::wkt(
                    position,
                    format!("unexpected character '{other}'"),
                ))
            }
        }
    }

    Ok(tokens)
}

type RawCoordinate = (Vec<f64>, usize);

struct Parser {
    tokens: Vec<(Token, usize)>,
    index: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn new(text: &str) -> Result<Self, GeometryError> {
        Ok(Self {
            tokens: tokenize(text)?,
            index: 0,
            end: text.len(),
            depth: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|(token, _)| token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.index)
            .map_or(self.end, |(_, position)| *position)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> GeometryError {
        GeometryError::wkt(self.position(), message)
    }

    fn expect(&mut self, expected: Token) -> Result<(), GeometryError> {
        if self.peek() == Some(&expected) {
            self.index += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected {}", describe(&expected))))
        }
    }

    fn peek_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(word))
    }

    fn eat_empty(&mut self) -> bool {
        let empty = self.peek_word("EMPTY");
        if empty {
            self.index += 1;
        }
        empty
    }

    /// Consumes a comma and returns true, or consumes the closing parenthesis and returns false.
    fn list_continues(&mut self) -> Result<bool, GeometryError> {
        match self.peek() {
            Some(Token::Comma) => {
                self.index += 1;
                Ok(true)
            }
            Some(Token::Close) => {
                self.index += 1;
                Ok(false)
            }
            _ => Err(self.error("expected ',' or ')'")),
        }
    }

    fn tag(&mut self) -> Result<(GeometryKind, Option<Dimensions>), GeometryError> {
        let position = self.position();
        let Some((Token::Word(word), _)) = self.next() else {
            return Err(GeometryError::wkt(position, "expected geometry type"));
        };

        let (kind, mut dimensions) = split_tag(&word).ok_or_else(|| {
            GeometryError::wkt(position, format!("unknown geometry type '{word}'"))
        })?;

        if dimensions.is_none() {
            if let Some(Token::Word(word)) = self.peek() {
                dimensions = dimension_tag(word);
                if dimensions.is_some() {
                    self.index += 1;
                }
            }
        }

        Ok((kind, dimensions))
    }

    fn geometry(&mut self, inherited: Option<Dimensions>) -> Result<Geom, GeometryError> {
        let (kind, dimensions) = self.tag()?;
        self.body(kind, dimensions, inherited)
    }

    /// Parses what follows the tag. Empty geometries without own dimension tag get the inherited dimensions.
    fn body(
        &mut self,
        kind: GeometryKind,
        explicit: Option<Dimensions>,
        inherited: Option<Dimensions>,
    ) -> Result<Geom, GeometryError> {
        if self.depth == MAX_NESTING_DEPTH {
            return Err(self.error("geometries are nested too deep"));
        }

        self.depth += 1;
        let geometry = self.parse_body(kind, explicit, inherited);
        self.depth -= 1;
        geometry
    }

    fn parse_body(
        &mut self,
        kind: GeometryKind,
        explicit: Option<Dimensions>,
        inherited: Option<Dimensions>,
    ) -> Result<Geom, GeometryError> {
        if self.eat_empty() {
            return empty_geometry(kind, explicit.or(inherited).unwrap_or_default());
        }

        let geometry = match kind {
            GeometryKind::Point => {
                let position = self.position();
                let coordinates = self.coordinates()?;
                if coordinates.len() != 1 {
                    return Err(GeometryError::wkt(
                        position,
                        "point must have exactly one coordinate",
                    ));
                }
                let (_, points) = resolve(explicit, coordinates)?;
                Geom::Point(points[0])
            }
            GeometryKind::LineString => {
                let (dimensions, points) = resolve(explicit, self.coordinates()?)?;
                Geom::LineString(LineString::with_dimensions(dimensions, points))
            }
            GeometryKind::CircularString => {
                let position = self.position();
                let (dimensions, points) = resolve(explicit, self.coordinates()?)?;
                if !CircularString::forms_arcs(points.len()) {
                    return Err(GeometryError::wkt(
                        position,
                        format!("circular string with {} vertices", points.len()),
                    ));
                }
                Geom::CircularString(CircularString::with_dimensions(dimensions, points))
            }
            GeometryKind::CompoundCurve => {
                let curves = self.curve_list(explicit)?;
                let dimensions = explicit
                    .or_else(|| curves.first().map(Curve::dimensions))
                    .unwrap_or_default();
                let mut compound = CompoundCurve::empty(dimensions);
                for curve in curves {
                    compound.add_curve(curve);
                }
                Geom::CompoundCurve(compound)
            }
            GeometryKind::Polygon => {
                self.expect(Token::Open)?;
                let mut rings = vec![];
                loop {
                    let (dimensions, points) = resolve(explicit, self.coordinates()?)?;
                    rings.push(LineString::with_dimensions(dimensions, points));
                    if !self.list_continues()? {
                        break;
                    }
                }
                Geom::Polygon(build_polygon(explicit, rings))
            }
            GeometryKind::CurvePolygon => {
                let rings = self.curve_list(explicit)?;
                Geom::CurvePolygon(build_polygon(explicit, rings))
            }
            collection_kind => self.collection(collection_kind, explicit)?,
        };

        Ok(geometry)
    }

    /// List of curves where line strings have no tag.
    fn curve_list(&mut self, explicit: Option<Dimensions>) -> Result<Vec<Curve>, GeometryError> {
        self.expect(Token::Open)?;
        let mut curves = vec![];
        loop {
            let curve = if self.peek() == Some(&Token::Open) {
                let (dimensions, points) = resolve(explicit, self.coordinates()?)?;
                Curve::LineString(LineString::with_dimensions(dimensions, points))
            } else {
                let position = self.position();
                Curve::try_from(self.geometry(explicit)?).map_err(|geometry| {
                    GeometryError::wkt(
                        position,
                        format!("{} is not a curve", geometry.wkb_type()),
                    )
                })?
            };
            curves.push(curve);

            if !self.list_continues()? {
                break;
            }
        }

        Ok(curves)
    }

    fn collection(
        &mut self,
        kind: GeometryKind,
        explicit: Option<Dimensions>,
    ) -> Result<Geom, GeometryError> {
        self.expect(Token::Open)?;
        let untagged = kind.untagged_part();
        let mut parts = vec![];
        loop {
            let position = self.position();
            let part = match (self.peek().cloned(), untagged) {
                (Some(Token::Open), Some(part_kind)) => self.body(part_kind, explicit, explicit)?,
                (Some(Token::Word(word)), Some(part_kind))
                    if word.eq_ignore_ascii_case("EMPTY") =>
                {
                    self.body(part_kind, explicit, explicit)?
                }
                (Some(Token::Number(_)), Some(GeometryKind::Point)) => {
                    let (_, points) = resolve(explicit, vec![self.coordinate()?])?;
                    Geom::Point(points[0])
                }
                _ => self.geometry(explicit)?,
            };
            parts.push((part, position));

            if !self.list_continues()? {
                break;
            }
        }

        let wkb_type = WkbType::new(kind, explicit.unwrap_or_default());
        let mut collection = GeometryCollection::with_type(wkb_type)
            .ok_or_else(|| self.error(format!("{wkb_type} is not a collection")))?;
        for (part, position) in parts {
            let part_type = part.wkb_type();
            if !collection.add_geometry(part) {
                return Err(GeometryError::wkt(
                    position,
                    format!("{part_type} cannot be a part of {wkb_type}"),
                ));
            }
        }

        Ok(Geom::GeometryCollection(collection))
    }

    /// Parenthesized list of coordinates.
    fn coordinates(&mut self) -> Result<Vec<RawCoordinate>, GeometryError> {
        self.expect(Token::Open)?;
        let mut coordinates = vec![];
        loop {
            coordinates.push(self.coordinate()?);
            if !self.list_continues()? {
                break;
            }
        }

        Ok(coordinates)
    }

    fn coordinate(&mut self) -> Result<RawCoordinate, GeometryError> {
        let position = self.position();
        let mut values = vec![];
        while let Some(Token::Number(value)) = self.peek() {
            values.push(*value);
            self.index += 1;
        }

        if values.len() < 2 {
            return Err(GeometryError::wkt(position, "expected coordinate"));
        }

        Ok((values, position))
    }
}

fn describe(token: &Token) -> &'static str {
    match token {
        Token::Open => "'('",
        Token::Close => "')'",
        Token::Comma => "','",
        Token::Word(_) => "word",
        Token::Number(_) => "number",
    }
}

fn dimension_tag(word: &str) -> Option<Dimensions> {
    match word.to_ascii_uppercase().as_str() {
        "Z" => Some(Dimensions::Xyz),
        "M" => Some(Dimensions::Xym),
        "ZM" => Some(Dimensions::Xyzm),
        _ => None,
    }
}

/// Splits `LineStringZM`-like tags into the kind and the dimensions.
fn split_tag(word: &str) -> Option<(GeometryKind, Option<Dimensions>)> {
    if let Some(kind) = GeometryKind::from_wkt_name(word) {
        return Some((kind, None));
    }

    let upper = word.to_ascii_uppercase();
    ["ZM", "Z", "M"].into_iter().find_map(|suffix| {
        let name = upper.strip_suffix(suffix)?;
        Some((GeometryKind::from_wkt_name(name)?, dimension_tag(suffix)))
    })
}

/// Converts raw coordinates into points. Without explicit dimensions they are inferred from the first
/// coordinate.
fn resolve(
    explicit: Option<Dimensions>,
    coordinates: Vec<RawCoordinate>,
) -> Result<(Dimensions, Vec<Point>), GeometryError> {
    let dimensions = match explicit {
        Some(dimensions) => dimensions,
        None => match coordinates.first().map(|(values, _)| values.len()) {
            None | Some(2) => Dimensions::Xy,
            Some(3) => Dimensions::Xyz,
            Some(4) => Dimensions::Xyzm,
            Some(count) => {
                return Err(GeometryError::wkt(
                    coordinates[0].1,
                    format!("unsupported number of ordinates: {count}"),
                ))
            }
        },
    };

    let points = coordinates
        .into_iter()
        .map(|(values, position)| {
            if values.len() != dimensions.size() {
                return Err(GeometryError::wkt(
                    position,
                    format!(
                        "expected {} ordinates, found {}",
                        dimensions.size(),
                        values.len()
                    ),
                ));
            }

            let mut point = Point::new(values[0], values[1]);
            let mut rest = values[2..].iter().copied();
            if dimensions.has_z() {
                point.set_z(rest.next());
            }
            if dimensions.has_m() {
                point.set_m(rest.next());
            }
            Ok(point)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((dimensions, points))
}

fn build_polygon<R: Ring>(explicit: Option<Dimensions>, rings: Vec<R>) -> Polygon<R> {
    let dimensions = explicit
        .or_else(|| rings.first().map(Ring::dimensions))
        .unwrap_or_default();
    let mut polygon = Polygon::empty(dimensions);
    for (index, ring) in rings.into_iter().enumerate() {
        if index == 0 {
            polygon.set_exterior_ring(ring);
        } else {
            polygon.add_interior_ring(ring);
        }
    }

    polygon
}

fn empty_geometry(kind: GeometryKind, dimensions: Dimensions) -> Result<Geom, GeometryError> {
    let geometry = match kind {
        GeometryKind::Point => Geom::Point(Point::empty(dimensions)),
        GeometryKind::LineString => Geom::LineString(LineString::empty(dimensions)),
        GeometryKind::CircularString => Geom::CircularString(CircularString::empty(dimensions)),
        GeometryKind::CompoundCurve => Geom::CompoundCurve(CompoundCurve::empty(dimensions)),
        GeometryKind::Polygon => Geom::Polygon(Polygon::empty(dimensions)),
        GeometryKind::CurvePolygon => Geom::CurvePolygon(CurvePolygon::empty(dimensions)),
        collection_kind => {
            let wkb_type = WkbType::new(collection_kind, dimensions);
            Geom::GeometryCollection(
                GeometryCollection::with_type(wkb_type)
                    .ok_or(GeometryError::UnknownWkbType(wkb_type.iso_code()))?,
            )
        }
    };

    Ok(geometry)
}
