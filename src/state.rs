//! Cascading presentation state, recomputed immutably at every step of
//! the traversal and passed down by value.

use crate::model::{
    Color, DisplayMode, FillRule, LineCap, LineJoin, Paint, PresentationAttributes,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct State {
    pub opacity: f32,
    pub display: DisplayMode,

    pub stroke: Color,
    pub stroke_width: f32,
    pub stroke_opacity: f32,
    pub stroke_line_cap: LineCap,
    pub stroke_line_join: LineJoin,
    pub stroke_miter_limit: f32,
    pub stroke_dash_array: Vec<f32>,

    pub fill: Paint,
    pub fill_opacity: f32,
    pub fill_rule: FillRule,
}

impl Default for State {
    /// Root document element state.
    fn default() -> Self {
        Self {
            opacity: 1.0,
            display: DisplayMode::Inline,

            stroke: Color::None,
            stroke_width: 1.0,
            stroke_opacity: 1.0,
            stroke_line_cap: LineCap::Butt,
            stroke_line_join: LineJoin::Miter,
            stroke_miter_limit: 4.0,
            stroke_dash_array: Vec::new(),

            fill: Paint::Color(Color::black()),
            fill_opacity: 1.0,
            fill_rule: FillRule::EvenOdd,
        }
    }
}

impl State {
    /// Pure cascade step. Every stroke/fill field and `display` fall
    /// back to the inherited value; `opacity` never inherits — it is the
    /// element's own value or exactly 1.0, because opacity composites
    /// per node rather than cascading.
    pub fn for_element(attributes: &PresentationAttributes, inheriting: &State) -> State {
        State {
            opacity: attributes.opacity.unwrap_or(1.0),
            display: attributes.display.unwrap_or(inheriting.display),

            stroke: attributes.stroke.unwrap_or(inheriting.stroke),
            stroke_width: attributes.stroke_width.unwrap_or(inheriting.stroke_width),
            stroke_opacity: attributes.stroke_opacity.unwrap_or(inheriting.stroke_opacity),
            stroke_line_cap: attributes
                .stroke_line_cap
                .unwrap_or(inheriting.stroke_line_cap),
            stroke_line_join: attributes
                .stroke_line_join
                .unwrap_or(inheriting.stroke_line_join),
            stroke_miter_limit: attributes
                .stroke_miter_limit
                .unwrap_or(inheriting.stroke_miter_limit),
            stroke_dash_array: attributes
                .stroke_dash_array
                .clone()
                .unwrap_or_else(|| inheriting.stroke_dash_array.clone()),

            fill: attributes
                .fill
                .clone()
                .unwrap_or_else(|| inheriting.fill.clone()),
            fill_opacity: attributes.fill_opacity.unwrap_or(inheriting.fill_opacity),
            fill_rule: attributes.fill_rule.unwrap_or(inheriting.fill_rule),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_defaults_match_the_document_model() {
        let state = State::default();
        assert_eq!(state.opacity, 1.0);
        assert_eq!(state.display, DisplayMode::Inline);
        assert_eq!(state.stroke, Color::None);
        assert_eq!(state.stroke_width, 1.0);
        assert_eq!(state.stroke_line_cap, LineCap::Butt);
        assert_eq!(state.stroke_line_join, LineJoin::Miter);
        assert_eq!(state.stroke_miter_limit, 4.0);
        assert!(state.stroke_dash_array.is_empty());
        assert_eq!(state.fill, Paint::Color(Color::black()));
        assert_eq!(state.fill_rule, FillRule::EvenOdd);
    }

    #[test]
    fn opacity_is_never_inherited() {
        let parent = State {
            opacity: 0.25,
            ..State::default()
        };

        let undeclared = PresentationAttributes::default();
        assert_eq!(State::for_element(&undeclared, &parent).opacity, 1.0);

        let declared = PresentationAttributes {
            opacity: Some(0.5),
            ..Default::default()
        };
        assert_eq!(State::for_element(&declared, &parent).opacity, 0.5);
    }

    #[test]
    fn undeclared_fields_inherit() {
        let parent = State {
            display: DisplayMode::None,
            stroke: Color::Rgb(10, 20, 30),
            stroke_width: 3.0,
            stroke_dash_array: vec![1.0, 2.0],
            fill: Paint::Reference("dots".to_string()),
            fill_rule: FillRule::NonZero,
            ..State::default()
        };

        let state = State::for_element(&PresentationAttributes::default(), &parent);
        assert_eq!(state.display, DisplayMode::None);
        assert_eq!(state.stroke, Color::Rgb(10, 20, 30));
        assert_eq!(state.stroke_width, 3.0);
        assert_eq!(state.stroke_dash_array, vec![1.0, 2.0]);
        assert_eq!(state.fill, Paint::Reference("dots".to_string()));
        assert_eq!(state.fill_rule, FillRule::NonZero);
    }

    #[test]
    fn declared_fields_override_the_cascade() {
        let parent = State {
            stroke_width: 3.0,
            ..State::default()
        };
        let attributes = PresentationAttributes {
            stroke_width: Some(0.5),
            fill: Some(Paint::Color(Color::Rgb(255, 0, 0))),
            ..Default::default()
        };

        let state = State::for_element(&attributes, &parent);
        assert_eq!(state.stroke_width, 0.5);
        assert_eq!(state.fill, Paint::Color(Color::Rgb(255, 0, 0)));
    }
}
