//! Recording line format
//!
//! One JSON object per line, tagged by `"type"`:
//!
//! ```text
//! {"type":"header","version":1,"width":800.0,"height":600.0,"seed":42}
//! {"type":"keyframe","t":0.05,"entities":[{"id":"Huluwa#1","rt":"CIRCLE","w":30.0,"h":30.0,"color":[0.0,1.0,0.0,1.0],"x":400.0,"y":300.0}]}
//! ```
//!
//! Reading is tolerant at the field level: field order does not matter,
//! unknown fields are ignored, missing or mistyped numbers read as 0 and a
//! missing or malformed color reads as `DEFAULT_COLOR`.

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::sim::world::{Color, Entity, ShapeKind};

/// Current line format version
pub const FORMAT_VERSION: u32 = 1;

/// Color for snapshots whose color is missing or unreadable
pub const DEFAULT_COLOR: Color = Color::rgba(0.9, 0.9, 0.2, 1.0);

/// A single line of a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecordLine {
    Header(SessionHeader),
    Keyframe(Keyframe),
}

impl RecordLine {
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse one stored line; `None` for anything that isn't a JSON object
    /// with a known `type`
    pub fn parse(line: &str) -> Option<Self> {
        serde_json::from_str(line.trim()).ok()
    }
}

/// Session metadata, written once at the start of a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionHeader {
    pub version: u32,
    pub width: f32,
    pub height: f32,
    pub seed: u64,
}

impl Default for SessionHeader {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            width: 0.0,
            height: 0.0,
            seed: 0,
        }
    }
}

/// One timestamped sample of every renderable entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Seconds since the session started
    #[serde(default, deserialize_with = "lenient_f64")]
    pub t: f64,
    #[serde(default, deserialize_with = "lenient_entities")]
    pub entities: Vec<EntitySnapshot>,
}

/// Pose and appearance of one entity inside a keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// `None` when the stored shape is missing or unrecognized
    #[serde(default, deserialize_with = "lenient_shape", skip_serializing_if = "Option::is_none")]
    pub rt: Option<ShapeKind>,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub w: f32,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub h: f32,
    #[serde(default = "default_color", deserialize_with = "lenient_color")]
    pub color: Color,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub x: f32,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub y: f32,
}

impl Default for EntitySnapshot {
    fn default() -> Self {
        Self {
            id: String::new(),
            rt: None,
            w: 0.0,
            h: 0.0,
            color: DEFAULT_COLOR,
            x: 0.0,
            y: 0.0,
        }
    }
}

impl EntitySnapshot {
    /// Snapshot of a renderable entity (needs both a transform and a render descriptor)
    pub fn of(entity: &Entity) -> Option<Self> {
        let pos = entity.position()?;
        let render = entity.render?;
        Some(Self {
            id: format!("{}#{}", entity.name, entity.id.0),
            rt: Some(render.shape),
            w: render.size.x,
            h: render.size.y,
            color: render.color,
            x: pos.x,
            y: pos.y,
        })
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

fn default_color() -> Color {
    DEFAULT_COLOR
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Value::deserialize(d)?.as_f64().unwrap_or(0.0))
}

fn lenient_f32<'de, D: Deserializer<'de>>(d: D) -> Result<f32, D::Error> {
    Ok(Value::deserialize(d)?.as_f64().unwrap_or(0.0) as f32)
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_shape<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ShapeKind>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => ShapeKind::from_str(&s),
        _ => None,
    })
}

fn lenient_color<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
    let Value::Array(items) = Value::deserialize(d)? else {
        return Ok(DEFAULT_COLOR);
    };
    let channels: Option<Vec<f32>> = items.iter().map(|v| v.as_f64().map(|c| c as f32)).collect();
    Ok(match channels.as_deref() {
        Some([r, g, b]) => Color::rgb(*r, *g, *b),
        Some([r, g, b, a, ..]) => Color::rgba(*r, *g, *b, *a),
        _ => DEFAULT_COLOR,
    })
}

/// Keeps list positions: an unreadable element becomes a default snapshot
fn lenient_entities<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<EntitySnapshot>, D::Error> {
    let Value::Array(items) = Value::deserialize(d)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyframe(line: &str) -> Keyframe {
        match RecordLine::parse(line) {
            Some(RecordLine::Keyframe(kf)) => kf,
            other => panic!("expected keyframe, got {:?}", other),
        }
    }

    #[test]
    fn test_keyframe_wire_shape() {
        let kf = RecordLine::Keyframe(Keyframe {
            t: 1.5,
            entities: vec![EntitySnapshot {
                id: "Monster#3".into(),
                rt: Some(ShapeKind::Rectangle),
                w: 25.0,
                h: 25.0,
                color: Color::rgb(1.0, 0.0, 1.0),
                x: 10.0,
                y: 20.0,
            }],
        });
        assert_eq!(
            kf.to_line().unwrap(),
            r#"{"type":"keyframe","t":1.5,"entities":[{"id":"Monster#3","rt":"RECTANGLE","w":25.0,"h":25.0,"color":[1.0,0.0,1.0,1.0],"x":10.0,"y":20.0}]}"#
        );
    }

    #[test]
    fn test_field_order_is_irrelevant() {
        let kf = keyframe(
            r#"{"entities":[{"y":2,"x":1,"color":[0,0,1,0.5],"h":4,"w":3,"rt":"CIRCLE","id":"a"}],"t":0.25,"type":"keyframe"}"#,
        );
        assert_eq!(kf.t, 0.25);
        let e = &kf.entities[0];
        assert_eq!((e.x, e.y, e.w, e.h), (1.0, 2.0, 3.0, 4.0));
        assert_eq!(e.rt, Some(ShapeKind::Circle));
        assert_eq!(e.color, Color::rgba(0.0, 0.0, 1.0, 0.5));
    }

    #[test]
    fn test_missing_and_malformed_fields_default() {
        let kf = keyframe(
            r#"{"type":"keyframe","t":"soon","entities":[{"id":7,"rt":"LINE","w":null,"color":"red","extra":{"nested":true}},{},42]}"#,
        );
        assert_eq!(kf.t, 0.0);
        assert_eq!(kf.entities.len(), 3);
        let e = &kf.entities[0];
        assert_eq!(e.id, "7");
        assert_eq!(e.rt, None);
        assert_eq!((e.w, e.h, e.x, e.y), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(e.color, DEFAULT_COLOR);
        assert_eq!(kf.entities[1], EntitySnapshot::default());
        assert_eq!(kf.entities[2], EntitySnapshot::default());
    }

    #[test]
    fn test_three_channel_color_gets_opaque_alpha() {
        let kf = keyframe(r#"{"type":"keyframe","t":1,"entities":[{"color":[0.1,0.2,0.3]}]}"#);
        assert_eq!(kf.entities[0].color, Color::rgba(0.1, 0.2, 0.3, 1.0));
    }

    #[test]
    fn test_missing_entities_is_empty() {
        let kf = keyframe(r#"{"type":"keyframe","t":2}"#);
        assert!(kf.entities.is_empty());
    }

    #[test]
    fn test_non_keyframe_lines() {
        assert!(matches!(
            RecordLine::parse(r#"{"type":"header","version":1,"width":800,"height":600,"seed":9}"#),
            Some(RecordLine::Header(SessionHeader { seed: 9, .. }))
        ));
        assert!(RecordLine::parse(r#"{"type":"input","keys":[1]}"#).is_none());
        assert!(RecordLine::parse(r#"{"t":1}"#).is_none());
        assert!(RecordLine::parse("not json at all").is_none());
        assert!(RecordLine::parse("").is_none());
    }
}
