//! Detection parsing: recover bounding boxes from a vision model's free-text reply.
//!
//! One detection is a bracketed, comma-separated tuple:
//!
//! ```text
//! tuple := "[" int "," int "," int "," int "," label "]"
//! int   := digit+              (0..=1000, surrounding whitespace allowed)
//! label := any text without "[", "]" or ","   (trimmed, non-empty)
//! ```
//!
//! Coordinates are ordered `ymin, xmin, ymax, xmax` in the model's 0–1000
//! normalized space. Anything outside the grammar is skipped, never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound of the normalized coordinate space.
pub const NORMALIZED_MAX: u32 = 1000;

/// Innermost bracketed groups; nested brackets resolve to the inner tuple.
static TUPLE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]]*)\]").unwrap());

/// A detection rectangle in normalized 0–1000 space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub label: String,
    pub ymin: u32,
    pub xmin: u32,
    pub ymax: u32,
    pub xmax: u32,
}

impl BoundingBox {
    /// Build a box, returning `None` unless `ymin < ymax`, `xmin < xmax`,
    /// every coordinate is within 0–1000 and the label is non-blank.
    pub fn new(
        label: impl Into<String>,
        ymin: u32,
        xmin: u32,
        ymax: u32,
        xmax: u32,
    ) -> Option<Self> {
        let label = label.into().trim().to_string();
        let valid = !label.is_empty()
            && ymin < ymax
            && xmin < xmax
            && ymax <= NORMALIZED_MAX
            && xmax <= NORMALIZED_MAX;
        valid.then_some(Self { label, ymin, xmin, ymax, xmax })
    }
}

/// Extract every well-formed detection tuple from `text`, in source order.
///
/// Empty text, text without tuples, and text made only of malformed tuples
/// all yield an empty vector.
pub fn parse_boxes(text: &str) -> Vec<BoundingBox> {
    TUPLE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let body = caps.get(1)?.as_str();
            match parse_tuple(body) {
                Ok(bbox) => Some(bbox),
                Err(reason) => {
                    debug!(tuple = body, reason, "Skipping malformed detection");
                    None
                }
            }
        })
        .collect()
}

fn parse_tuple(body: &str) -> Result<BoundingBox, &'static str> {
    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() != 5 {
        return Err("expected four coordinates and a label");
    }

    let mut coords = [0u32; 4];
    for (slot, field) in coords.iter_mut().zip(&fields[..4]) {
        let field = field.trim();
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err("coordinate is not a non-negative integer");
        }
        *slot = field.parse().map_err(|_| "coordinate overflows")?;
    }

    let [ymin, xmin, ymax, xmax] = coords;
    BoundingBox::new(fields[4], ymin, xmin, ymax, xmax)
        .ok_or("box is empty, inverted, unlabeled or outside 0-1000")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_tuple_in_field_order() {
        let boxes = parse_boxes("[10, 20, 30, 40, coffee mug]");
        assert_eq!(
            boxes,
            vec![BoundingBox {
                label: "coffee mug".into(),
                ymin: 10,
                xmin: 20,
                ymax: 30,
                xmax: 40,
            }]
        );
    }

    #[test]
    fn garbage_tuple_does_not_stop_later_ones() {
        let text = "Here: [100,200,300,400, solar panel] and garbage [abc,1,2,3,x] then [1,2,3,4,lamp]";
        let labels: Vec<_> = parse_boxes(text).into_iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["solar panel", "lamp"]);
    }

    #[test]
    fn empty_and_plain_text_yield_nothing() {
        assert!(parse_boxes("").is_empty());
        assert!(parse_boxes("I could not find any objects.").is_empty());
        assert!(parse_boxes("[see below]").is_empty());
    }

    #[test]
    fn rejects_wrong_field_counts() {
        assert!(parse_boxes("[1,2,3,solar panel]").is_empty());
        // A comma inside the label is outside the grammar.
        assert!(parse_boxes("[1,2,3,4,panel, large]").is_empty());
    }

    #[test]
    fn rejects_signed_and_fractional_coordinates() {
        assert!(parse_boxes("[-1,2,3,4,cup]").is_empty());
        assert!(parse_boxes("[+1,2,3,4,cup]").is_empty());
        assert!(parse_boxes("[1.5,2,3,4,cup]").is_empty());
        assert!(parse_boxes("[99999999999,2,3,4,cup]").is_empty());
    }

    #[test]
    fn drops_boxes_violating_normalized_bounds() {
        assert!(parse_boxes("[300,200,100,400,inverted]").is_empty());
        assert!(parse_boxes("[100,200,100,400,flat]").is_empty());
        assert!(parse_boxes("[0,0,1001,500,too big]").is_empty());
        assert!(parse_boxes("[0,0,10,10,   ]").is_empty());
        assert_eq!(parse_boxes("[0,0,1000,1000,whole frame]").len(), 1);
    }

    #[test]
    fn nested_brackets_resolve_to_inner_tuple() {
        let boxes = parse_boxes("[[5, 6, 7, 8, bottle], [1, 1, 2, 2, can]]");
        let labels: Vec<_> = boxes.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["bottle", "can"]);
    }

    #[test]
    fn duplicate_labels_stay_separate() {
        let boxes = parse_boxes("[1,1,5,5,chair][10,10,50,50,chair]");
        assert_eq!(boxes.len(), 2);
        assert_ne!(boxes[0], boxes[1]);
    }

    #[test]
    fn tolerates_whitespace_and_newlines() {
        let boxes = parse_boxes("[\n  12 ,\t34 , 56 , 78 ,\n  wind turbine \n]");
        assert_eq!(boxes[0].label, "wind turbine");
        assert_eq!((boxes[0].ymin, boxes[0].xmax), (12, 78));
    }
}
