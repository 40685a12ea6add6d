//! Typed decoder for the inference service's response shapes.
//!
//! The service has emitted several incompatible layouts over time. Each one
//! is a [`ResponseShape`]; [`decode_response`] tries them in a fixed priority
//! order and the first that yields both move tokens wins.

use arena_core::{DataError, Move, MoveSelection, Side};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::metadata::WarriorProfile;

/// Known response layouts, in decode priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseShape {
    /// `{"agent_1": {"move": "strike"}, "agent_2": {"move": "dodge"}}`
    NestedAgent,
    /// `{"agent_1_move": "strike", "agent_2_move": "dodge"}`
    FlatMoveField,
    /// `{"moves": {"agent_1": "strike", "agent_2": "dodge"}}`
    MovesObject,
    /// `{"agent_1": "strike", "agent_2": "dodge"}`
    FlatString,
    /// `{"agent_1.move": "strike"}` or `{"agent_1[move]": "strike"}`
    DottedKey,
    /// `{"agent_moves": {...}}` or `{"agentMoves": {...}}` wrapping any of the above
    AgentMovesWrapper,
}

impl ResponseShape {
    pub const PRIORITY: [ResponseShape; 6] = [
        ResponseShape::NestedAgent,
        ResponseShape::FlatMoveField,
        ResponseShape::MovesObject,
        ResponseShape::FlatString,
        ResponseShape::DottedKey,
        ResponseShape::AgentMovesWrapper,
    ];
}

/// Outcome of decoding one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMoves {
    pub selection: MoveSelection,
    pub shape: ResponseShape,
    /// Sides whose token was unrecognized and fell back to [`Move::FALLBACK`].
    pub fallbacks: Vec<Side>,
    /// Hex signature supplied alongside the moves, if any.
    pub signature: Option<String>,
}

fn agent_keys(side: Side) -> [&'static str; 3] {
    match side {
        Side::A => ["agent_1", "agent1", "agentOne"],
        Side::B => ["agent_2", "agent2", "agentTwo"],
    }
}

/// Unwraps string payloads that themselves contain JSON, any depth.
fn unwrap_json_strings(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('{') || trimmed.starts_with('"') {
                if let Ok(inner) = serde_json::from_str::<Value>(trimmed) {
                    return unwrap_json_strings(&inner);
                }
            }
            value.clone()
        }
        _ => value.clone(),
    }
}

fn as_token(value: &Value) -> Option<String> {
    match unwrap_json_strings(value) {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn first_of<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

fn nested_agent(object: &Map<String, Value>, side: Side) -> Option<String> {
    let agent = unwrap_json_strings(first_of(object, &agent_keys(side))?);
    let agent = agent.as_object()?;
    as_token(first_of(agent, &["move", "Move", "action"])?)
}

fn flat_move_field(object: &Map<String, Value>, side: Side) -> Option<String> {
    let keys = agent_keys(side).map(|agent| match agent {
        "agent_1" => "agent_1_move",
        "agent_2" => "agent_2_move",
        "agent1" => "agent1Move",
        "agent2" => "agent2Move",
        "agentOne" => "agentOneMove",
        _ => "agentTwoMove",
    });
    as_token(first_of(object, &keys)?)
}

fn moves_object(object: &Map<String, Value>, side: Side) -> Option<String> {
    let moves = unwrap_json_strings(object.get("moves")?);
    let moves = moves.as_object()?;
    as_token(first_of(moves, &agent_keys(side))?)
}

fn flat_string(object: &Map<String, Value>, side: Side) -> Option<String> {
    as_token(first_of(object, &agent_keys(side))?)
}

fn dotted_key(object: &Map<String, Value>, side: Side) -> Option<String> {
    agent_keys(side).iter().find_map(|agent| {
        let dotted = format!("{agent}.move");
        let bracket = format!("{agent}[move]");
        let quoted = format!("{agent}['move']");
        first_of(object, &[dotted.as_str(), bracket.as_str(), quoted.as_str()]).and_then(as_token)
    })
}

fn agent_moves_wrapper(object: &Map<String, Value>) -> Option<(String, String, ResponseShape)> {
    let inner = unwrap_json_strings(first_of(object, &["agent_moves", "agentMoves"])?);
    let inner = inner.as_object()?;
    // The wrapper never nests itself; only the five direct shapes apply inside.
    ResponseShape::PRIORITY[..5]
        .iter()
        .find_map(|shape| extract(inner, *shape).map(|(a, b)| (a, b, *shape)))
}

fn extract(object: &Map<String, Value>, shape: ResponseShape) -> Option<(String, String)> {
    let read = |side| match shape {
        ResponseShape::NestedAgent => nested_agent(object, side),
        ResponseShape::FlatMoveField => flat_move_field(object, side),
        ResponseShape::MovesObject => moves_object(object, side),
        ResponseShape::FlatString => flat_string(object, side),
        ResponseShape::DottedKey => dotted_key(object, side),
        ResponseShape::AgentMovesWrapper => None,
    };
    Some((read(Side::A)?, read(Side::B)?))
}

fn signature_of(object: &Map<String, Value>) -> Option<String> {
    first_of(object, &["signature", "sig"]).and_then(as_token)
}

/// Resolves one token: a display name offered for this warrior first, then
/// the canonical vocabulary and its synonyms.
fn resolve(token: &str, profile: &WarriorProfile) -> (Move, bool) {
    match profile.move_for_name(token) {
        Some(mv) => (mv, false),
        None => Move::parse_or_fallback(token),
    }
}

/// Decodes a response into a normalized selection.
///
/// `profile_a` and `profile_b` carry the display names the prompt offered, so
/// a model answering with one of them gets the move it named. Unrecognized
/// tokens fall back to [`Move::FALLBACK`] and are reported in
/// [`DecodedMoves::fallbacks`]; a response in no known shape is a
/// [`DataError`].
pub fn decode_response(
    raw: &Value,
    profile_a: &WarriorProfile,
    profile_b: &WarriorProfile,
) -> Result<DecodedMoves, DataError> {
    let root = unwrap_json_strings(raw);
    let object = root
        .as_object()
        .ok_or_else(|| DataError::unrecognized_shape(raw.to_string()))?;

    let found = ResponseShape::PRIORITY.iter().find_map(|shape| match shape {
        ResponseShape::AgentMovesWrapper => agent_moves_wrapper(object)
            .map(|(a, b, _inner)| (a, b, ResponseShape::AgentMovesWrapper)),
        _ => extract(object, *shape).map(|(a, b)| (a, b, *shape)),
    });
    let (token_a, token_b, shape) =
        found.ok_or_else(|| DataError::unrecognized_shape(raw.to_string()))?;

    let (a, fallback_a) = resolve(&token_a, profile_a);
    let (b, fallback_b) = resolve(&token_b, profile_b);
    let fallbacks = [(Side::A, fallback_a, &token_a), (Side::B, fallback_b, &token_b)]
        .into_iter()
        .filter(|(_, fell_back, _)| *fell_back)
        .map(|(side, _, token)| {
            tracing::warn!(%side, token = %token, fallback = %Move::FALLBACK, "unrecognized move token");
            side
        })
        .collect();

    Ok(DecodedMoves {
        selection: MoveSelection::new(a, b),
        shape,
        fallbacks,
        signature: signature_of(object),
    })
}

#[cfg(test)]
mod tests {
    use arena_core::DataErrorKind;
    use serde_json::json;

    use super::*;

    fn decode(raw: Value) -> DecodedMoves {
        let unnamed = WarriorProfile::default();
        decode_response(&raw, &unnamed, &unnamed).unwrap()
    }

    #[test]
    fn nested_agent_objects() {
        let decoded = decode(json!({
            "agent_1": { "move": "special_move" },
            "agent_2": { "move": "dodge" }
        }));
        assert_eq!(decoded.selection, MoveSelection::new(Move::Special, Move::Dodge));
        assert_eq!(decoded.shape, ResponseShape::NestedAgent);
        assert!(decoded.fallbacks.is_empty());
    }

    #[test]
    fn flat_move_fields() {
        let decoded = decode(json!({ "agent_1_move": "taunt", "agent_2_move": "Recover" }));
        assert_eq!(decoded.selection, MoveSelection::new(Move::Taunt, Move::Recover));
        assert_eq!(decoded.shape, ResponseShape::FlatMoveField);
    }

    #[test]
    fn moves_sub_object() {
        let decoded = decode(json!({ "moves": { "agent_1": "strike", "agent_2": "special" } }));
        assert_eq!(decoded.selection, MoveSelection::new(Move::Strike, Move::Special));
        assert_eq!(decoded.shape, ResponseShape::MovesObject);
    }

    #[test]
    fn flat_strings_on_agent_keys() {
        let decoded = decode(json!({ "agent_1": "DODGE", "agent_2": "special-move" }));
        assert_eq!(decoded.selection, MoveSelection::new(Move::Dodge, Move::Special));
        assert_eq!(decoded.shape, ResponseShape::FlatString);
    }

    #[test]
    fn dotted_and_bracket_keys() {
        let dotted = decode(json!({ "agent_1.move": "strike", "agent_2.move": "taunt" }));
        assert_eq!(dotted.shape, ResponseShape::DottedKey);

        let bracket = decode(json!({ "agent_1[move]": "recover", "agent_2[move]": "dodge" }));
        assert_eq!(bracket.selection, MoveSelection::new(Move::Recover, Move::Dodge));
    }

    #[test]
    fn agent_moves_wrapper_in_both_spellings() {
        let snake = decode(json!({ "agent_moves": { "agent_1": "strike", "agent_2": "dodge" } }));
        assert_eq!(snake.shape, ResponseShape::AgentMovesWrapper);
        assert_eq!(snake.selection, MoveSelection::new(Move::Strike, Move::Dodge));

        let camel = decode(json!({
            "agentMoves": { "agent_1": { "move": "taunt" }, "agent_2": { "move": "taunt" } }
        }));
        assert_eq!(camel.selection, MoveSelection::new(Move::Taunt, Move::Taunt));
    }

    #[test]
    fn json_inside_strings_is_unwrapped() {
        let raw = Value::String(
            r#"{"agent_1":{"move":"special_move"},"agent_2":{"move":"dodge"}}"#.to_string(),
        );
        let decoded = decode(raw);
        assert_eq!(decoded.selection, MoveSelection::new(Move::Special, Move::Dodge));

        let inner = decode(json!({ "agent_1": "{\"move\":\"recover\"}", "agent_2": { "move": "strike" } }));
        assert_eq!(inner.selection, MoveSelection::new(Move::Recover, Move::Strike));
    }

    #[test]
    fn higher_priority_shape_wins() {
        let decoded = decode(json!({
            "agent_1": { "move": "dodge" },
            "agent_2": { "move": "dodge" },
            "agent_1_move": "strike",
            "agent_2_move": "strike"
        }));
        assert_eq!(decoded.shape, ResponseShape::NestedAgent);
        assert_eq!(decoded.selection, MoveSelection::new(Move::Dodge, Move::Dodge));
    }

    #[test]
    fn unknown_tokens_fall_back_to_strike() {
        let decoded = decode(json!({ "agent_1": "fireball", "agent_2": "dodge" }));
        assert_eq!(decoded.selection, MoveSelection::new(Move::Strike, Move::Dodge));
        assert_eq!(decoded.fallbacks, vec![Side::A]);
    }

    #[test]
    fn offered_display_names_map_back_to_their_moves() {
        let mut named = WarriorProfile::default();
        named.moves.insert("recover".into(), "Second Wind".into());
        named.moves.insert("special_move".into(), "Block".into());
        let unnamed = WarriorProfile::default();

        let raw = json!({ "agent_1": { "move": "second wind" }, "agent_2": { "move": "dodge" } });
        let decoded = decode_response(&raw, &named, &unnamed).unwrap();
        assert_eq!(decoded.selection, MoveSelection::new(Move::Recover, Move::Dodge));
        assert!(decoded.fallbacks.is_empty());

        // A display name wins over a synonym, but only for its own warrior.
        let raw = json!({ "agent_1": "Block", "agent_2": "Block" });
        let decoded = decode_response(&raw, &named, &unnamed).unwrap();
        assert_eq!(decoded.selection, MoveSelection::new(Move::Special, Move::Dodge));

        let raw = json!({ "agent_1": "strike", "agent_2": "Second Wind" });
        let decoded = decode_response(&raw, &named, &unnamed).unwrap();
        assert_eq!(decoded.selection, MoveSelection::new(Move::Strike, Move::Strike));
        assert_eq!(decoded.fallbacks, vec![Side::B]);
    }

    #[test]
    fn signature_is_surfaced() {
        let decoded = decode(json!({
            "agent_1": "strike",
            "agent_2": "taunt",
            "signature": "0xdeadbeef"
        }));
        assert_eq!(decoded.signature.as_deref(), Some("0xdeadbeef"));
    }

    #[test]
    fn unknown_shapes_are_data_errors() {
        for raw in [json!({ "agent_1": "strike" }), json!(["strike", "dodge"]), json!("plain text")] {
            let unnamed = WarriorProfile::default();
            let err = decode_response(&raw, &unnamed, &unnamed).unwrap_err();
            assert!(matches!(err.kind, DataErrorKind::UnrecognizedShape { .. }));
        }
    }
}
