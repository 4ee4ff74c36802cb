//! Expansion of document-level transform operations into primitive
//! geometric operations, angles converted to radians.

use crate::model::{Length, TransformOp, ViewBox};

/// Primitive transform operation carried on a layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Transform {
    Matrix {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        tx: f64,
        ty: f64,
    },
    Translate {
        tx: f64,
        ty: f64,
    },
    Scale {
        sx: f64,
        sy: f64,
    },
    Rotate {
        radians: f64,
    },
    SkewX {
        radians: f64,
    },
    SkewY {
        radians: f64,
    },
}

/// One document operation becomes one primitive op, except
/// rotate-about-point which expands to the standard pivot sandwich.
pub fn expand(op: TransformOp) -> Vec<Transform> {
    match op {
        TransformOp::Matrix { a, b, c, d, e, f } => vec![Transform::Matrix {
            a,
            b,
            c,
            d,
            tx: e,
            ty: f,
        }],
        TransformOp::Translate { tx, ty } => vec![Transform::Translate { tx, ty }],
        TransformOp::Scale { sx, sy } => vec![Transform::Scale { sx, sy }],
        TransformOp::Rotate { angle } => vec![Transform::Rotate {
            radians: angle.to_radians(),
        }],
        TransformOp::RotatePoint { angle, cx, cy } => vec![
            Transform::Translate { tx: cx, ty: cy },
            Transform::Rotate {
                radians: angle.to_radians(),
            },
            Transform::Translate { tx: -cx, ty: -cy },
        ],
        TransformOp::SkewX { angle } => vec![Transform::SkewX {
            radians: angle.to_radians(),
        }],
        TransformOp::SkewY { angle } => vec![Transform::SkewY {
            radians: angle.to_radians(),
        }],
    }
}

/// Concatenated expansions, in declaration order.
pub fn expand_all(ops: &[TransformOp]) -> Vec<Transform> {
    ops.iter().copied().flat_map(expand).collect()
}

/// Viewbox-to-viewport transform for the root layer: scale then
/// translate, each omitted when it is the identity. No viewbox means an
/// empty transform list.
pub fn root_transform(view_box: Option<ViewBox>, width: Length, height: Length) -> Vec<Transform> {
    let Some(vb) = view_box else {
        return Vec::new();
    };

    let scale = Transform::Scale {
        sx: width as f64 / vb.width,
        sy: height as f64 / vb.height,
    };
    let translate = Transform::Translate {
        tx: -vb.x,
        ty: -vb.y,
    };

    let mut transform = Vec::new();
    if scale != (Transform::Scale { sx: 1.0, sy: 1.0 }) {
        transform.push(scale);
    }
    if translate != (Transform::Translate { tx: 0.0, ty: 0.0 }) {
        transform.push(translate);
    }
    transform
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angles_convert_to_radians() {
        assert_eq!(
            expand(TransformOp::Rotate { angle: 90.0 }),
            vec![Transform::Rotate {
                radians: std::f64::consts::FRAC_PI_2,
            }]
        );
        assert_eq!(
            expand(TransformOp::SkewX { angle: 180.0 }),
            vec![Transform::SkewX {
                radians: std::f64::consts::PI,
            }]
        );
    }

    #[test]
    fn matrix_and_passthrough_ops_expand_to_one() {
        assert_eq!(
            expand(TransformOp::Matrix {
                a: 1.0,
                b: 2.0,
                c: 3.0,
                d: 4.0,
                e: 5.0,
                f: 6.0,
            }),
            vec![Transform::Matrix {
                a: 1.0,
                b: 2.0,
                c: 3.0,
                d: 4.0,
                tx: 5.0,
                ty: 6.0,
            }]
        );
        assert_eq!(
            expand(TransformOp::Translate { tx: 3.0, ty: 4.0 }),
            vec![Transform::Translate { tx: 3.0, ty: 4.0 }]
        );
    }

    #[test]
    fn rotate_about_point_is_the_pivot_sandwich() {
        let ops = expand(TransformOp::RotatePoint {
            angle: 90.0,
            cx: 5.0,
            cy: 7.0,
        });
        assert_eq!(
            ops,
            vec![
                Transform::Translate { tx: 5.0, ty: 7.0 },
                Transform::Rotate {
                    radians: std::f64::consts::FRAC_PI_2,
                },
                Transform::Translate { tx: -5.0, ty: -7.0 },
            ]
        );
    }

    #[test]
    fn expansions_concatenate_in_declaration_order() {
        let ops = expand_all(&[
            TransformOp::Scale { sx: 2.0, sy: 2.0 },
            TransformOp::RotatePoint {
                angle: 45.0,
                cx: 1.0,
                cy: 1.0,
            },
        ]);
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0], Transform::Scale { sx: 2.0, sy: 2.0 });
        assert_eq!(ops[1], Transform::Translate { tx: 1.0, ty: 1.0 });
    }

    #[test]
    fn root_transform_omits_identity_scale() {
        let vb = ViewBox {
            x: 5.0,
            y: 5.0,
            width: 10.0,
            height: 10.0,
        };
        assert_eq!(
            root_transform(Some(vb), 10, 10),
            vec![Transform::Translate { tx: -5.0, ty: -5.0 }]
        );
    }

    #[test]
    fn root_transform_omits_zero_translate() {
        let vb = ViewBox {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        assert_eq!(
            root_transform(Some(vb), 20, 10),
            vec![Transform::Scale { sx: 2.0, sy: 1.0 }]
        );
    }

    #[test]
    fn root_transform_without_view_box_is_empty() {
        assert!(root_transform(None, 20, 10).is_empty());
    }
}
