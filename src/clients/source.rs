use std::collections::VecDeque;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use crate::models::error::PositionError;
use crate::models::position::Position;

/// Where the sender gets its positions from: one initial fix, then a stream
/// of updates until the source runs dry.
#[async_trait]
pub trait PositionSource: Send {
    async fn current_position(&mut self) -> Result<Position, PositionError>;
    async fn watch_position(&mut self) -> Option<Result<Position, PositionError>>;
}

/// Reads one position per line, either `lat,lng` or a JSON object.
/// Blank lines are skipped.
pub struct LinePositionSource<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> LinePositionSource<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines() }
    }

    async fn next_position(&mut self) -> Option<Result<Position, PositionError>> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => return Some(parse_line(&line)),
                Ok(None) => return None,
                Err(e) => return Some(Err(PositionError::Unavailable(e.to_string()))),
            }
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> PositionSource for LinePositionSource<R> {
    async fn current_position(&mut self) -> Result<Position, PositionError> {
        self.next_position()
            .await
            .unwrap_or_else(|| Err(PositionError::Unavailable("input closed".to_string())))
    }

    async fn watch_position(&mut self) -> Option<Result<Position, PositionError>> {
        self.next_position().await
    }
}

pub fn parse_line(line: &str) -> Result<Position, PositionError> {
    let line = line.trim();
    if line.starts_with('{') {
        return Position::from_json(line).map_err(|e| PositionError::Unavailable(e.to_string()));
    }
    let (lat, lng) = line
        .split_once(',')
        .ok_or_else(|| PositionError::Unavailable(format!("expected `lat,lng`, got `{}`", line)))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| PositionError::Unavailable(format!("`{}`: {}", s.trim(), e)))
    };
    Ok(Position::new(parse(lat)?, parse(lng)?))
}

/// A canned source, handy for demos and tests.
pub struct FixedPositionSource {
    initial: Option<Result<Position, PositionError>>,
    updates: VecDeque<Result<Position, PositionError>>,
}

impl FixedPositionSource {
    pub fn new(
        initial: Result<Position, PositionError>,
        updates: Vec<Result<Position, PositionError>>,
    ) -> Self {
        Self {
            initial: Some(initial),
            updates: updates.into(),
        }
    }
}

#[async_trait]
impl PositionSource for FixedPositionSource {
    async fn current_position(&mut self) -> Result<Position, PositionError> {
        self.initial
            .take()
            .unwrap_or_else(|| Err(PositionError::Unavailable("already read".to_string())))
    }

    async fn watch_position(&mut self) -> Option<Result<Position, PositionError>> {
        self.updates.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_and_json_lines() {
        assert_eq!(parse_line(" 37.1, -122.2 ").unwrap(), Position::new(37.1, -122.2));
        assert_eq!(parse_line(r#"{"lat":1,"lng":2}"#).unwrap(), Position::new(1.0, 2.0));
        assert!(matches!(parse_line("nowhere"), Err(PositionError::Unavailable(_))));
        assert!(matches!(parse_line("1,east"), Err(PositionError::Unavailable(_))));
    }

    #[tokio::test]
    async fn line_source_yields_initial_then_updates() {
        let input: &[u8] = b"1,2\n\n3,4\nbad\n5,6\n";
        let mut source = LinePositionSource::new(input);

        assert_eq!(source.current_position().await.unwrap(), Position::new(1.0, 2.0));
        assert_eq!(source.watch_position().await.unwrap().unwrap(), Position::new(3.0, 4.0));
        assert!(source.watch_position().await.unwrap().is_err());
        assert_eq!(source.watch_position().await.unwrap().unwrap(), Position::new(5.0, 6.0));
        assert!(source.watch_position().await.is_none());
    }

    #[tokio::test]
    async fn empty_input_has_no_current_position() {
        let input: &[u8] = b"";
        let mut source = LinePositionSource::new(input);
        assert!(source.current_position().await.is_err());
    }
}
