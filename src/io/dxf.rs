use crate::cad::{CadEntity, CadPrimitive, EntityColor};
use crate::float_types::Real;
use dxf::Drawing;
use dxf::entities::{Entity, EntityType};
use geo::Coord;
use std::error::Error;
use std::io::Cursor;

fn coord(p: &dxf::Point) -> Coord<Real> {
    Coord {
        x: p.x as Real,
        y: p.y as Real,
    }
}

/// Palette index of the entity, with by-layer/by-block indirection
/// resolved through the layer table. Entities with no usable color get 7.
fn resolve_color(entity: &Entity, drawing: &Drawing) -> EntityColor {
    if let Some(index) = entity.common.color.index() {
        return EntityColor::Aci(index as i16);
    }
    let layer_color = drawing
        .layers()
        .find(|layer| layer.name == entity.common.layer)
        .and_then(|layer| layer.color.index());
    EntityColor::Aci(layer_color.map_or(7, |index| index as i16))
}

/// Import the supported entities of a DXF drawing.
///
/// ## Parameters
/// - `dxf_data`: A byte slice containing the DXF file data.
///
/// ## Returns
/// A `Result` containing the entity list or an error if parsing fails.
/// Unsupported entity kinds are skipped here; flattening decides later
/// which of the supported ones are degenerate.
pub fn entities_from_dxf(dxf_data: &[u8]) -> Result<Vec<CadEntity>, Box<dyn Error>> {
    let drawing = Drawing::load(&mut Cursor::new(dxf_data))?;

    let mut entities = Vec::new();
    for entity in drawing.entities() {
        let primitive = match &entity.specific {
            EntityType::Line(line) => Some(CadPrimitive::Line {
                start: coord(&line.p1),
                end: coord(&line.p2),
            }),
            EntityType::LwPolyline(poly) => Some(CadPrimitive::Polyline {
                vertices: poly
                    .vertices
                    .iter()
                    .map(|v| Coord {
                        x: v.x as Real,
                        y: v.y as Real,
                    })
                    .collect(),
            }),
            EntityType::Polyline(poly) => Some(CadPrimitive::Polyline {
                vertices: poly.vertices().map(|v| coord(&v.location)).collect(),
            }),
            EntityType::Circle(circle) => Some(CadPrimitive::Circle {
                center: coord(&circle.center),
                radius: circle.radius as Real,
            }),
            EntityType::Arc(arc) => Some(CadPrimitive::Arc {
                center: coord(&arc.center),
                radius: arc.radius as Real,
                start_angle: arc.start_angle as Real,
                end_angle: arc.end_angle as Real,
            }),
            EntityType::Spline(spline) => Some(CadPrimitive::Spline {
                fit_points: spline.fit_points.iter().map(coord).collect(),
                control_points: spline.control_points.iter().map(coord).collect(),
            }),
            // Ignore unsupported entity types for now
            _ => None,
        };
        if let Some(primitive) = primitive {
            entities.push(CadEntity {
                primitive,
                color: resolve_color(entity, &drawing),
                layer: entity.common.layer.clone(),
            });
        }
    }
    Ok(entities)
}
