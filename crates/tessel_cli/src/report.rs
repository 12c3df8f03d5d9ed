//! Tessellation reports printed by the CLI

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use tessel_gpu::{GraphicsContextSystem, GraphicsPipe, RecordingSink};
use tessel_paint::GraphicsContext;

/// Emitted geometry, included with `--json`
#[derive(Debug, Serialize)]
pub struct GeometryDump {
    pub vertices: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub instructions: usize,
    pub vertices: usize,
    pub indices: usize,
    pub triangles: usize,
    pub records: usize,
    pub batchable: bool,
    pub draw_calls: usize,
    /// Triangles drawn with each texture id
    pub triangles_per_texture: FxHashMap<u64, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryDump>,
}

impl Report {
    /// Tessellate `ctx` and collect its statistics
    pub fn build(system: &mut GraphicsContextSystem, ctx: &mut GraphicsContext, dump: bool) -> Self {
        let mut sink = RecordingSink::default();
        let draw_calls = GraphicsPipe::new().render(system, ctx, &mut sink);

        let entry = system.update_gpu_context(ctx);
        let geometry = &entry.geometry;
        let batchable = entry.is_batchable;
        let geometry_dump = dump.then(|| GeometryDump {
            vertices: geometry.vertices.clone(),
            uvs: geometry.uvs.clone(),
            indices: geometry.indices.clone(),
        });
        let (vertices, indices) = (geometry.vertex_count(), geometry.index_count());

        let entry = system.get_gpu_context(ctx);
        let mut triangles_per_texture: FxHashMap<u64, usize> = FxHashMap::default();
        let mut records = 0;
        if let Some(entry) = entry {
            for record in system.records(entry) {
                *triangles_per_texture.entry(record.texture.0).or_default() += record.index_size / 3;
                records += 1;
            }
        }

        Report {
            instructions: ctx.instructions().len(),
            vertices,
            indices,
            triangles: indices / 3,
            records,
            batchable,
            draw_calls,
            triangles_per_texture,
            geometry: geometry_dump,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "instructions: {}", self.instructions)?;
        writeln!(f, "vertices:     {}", self.vertices)?;
        writeln!(f, "triangles:    {}", self.triangles)?;
        writeln!(f, "records:      {}", self.records)?;
        writeln!(
            f,
            "batchable:    {}",
            if self.batchable { "yes" } else { "no" }
        )?;
        write!(f, "draw calls:   {}", self.draw_calls)?;

        let mut textures: Vec<_> = self.triangles_per_texture.iter().collect();
        textures.sort();
        for (texture, triangles) in textures {
            write!(f, "\n  texture {texture}: {triangles} triangles")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::Color;

    #[test]
    fn test_report_counts() {
        let mut system = GraphicsContextSystem::default();
        let mut ctx = system.create_context();
        ctx.rect(0.0, 0.0, 10.0, 10.0).fill_with(Color::RED);
        ctx.rect(20.0, 0.0, 10.0, 10.0).fill();

        let report = Report::build(&mut system, &mut ctx, false);
        assert_eq!(report.instructions, 2);
        assert_eq!(report.vertices, 8);
        assert_eq!(report.triangles, 4);
        assert_eq!(report.records, 2);
        assert!(report.batchable);
        assert_eq!(report.draw_calls, 1);
        assert_eq!(report.triangles_per_texture.get(&0), Some(&4));
        assert!(report.geometry.is_none());

        let text = report.to_string();
        assert!(text.contains("texture 0: 4 triangles"));
    }

    #[test]
    fn test_json_includes_geometry_on_request() {
        let mut system = GraphicsContextSystem::default();
        let mut ctx = system.create_context();
        ctx.rect(0.0, 0.0, 1.0, 1.0).fill();

        let report = Report::build(&mut system, &mut ctx, true);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["geometry"]["indices"], serde_json::json!([0, 1, 2, 0, 2, 3]));
        assert_eq!(json["triangles"], 2);
    }
}
