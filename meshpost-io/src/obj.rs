//! OBJ format support

use crate::{MeshReader, MeshWriter};
use meshpost_core::{Error, Point3f, Result, TriangleMesh};
use obj::{ObjData, SimplePolygon};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub struct ObjReader;
pub struct ObjWriter;

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let data = ObjData::load_buf(BufReader::new(file)).map_err(|e| {
            Error::InvalidData(format!("Failed to parse OBJ {}: {}", path.display(), e))
        })?;

        Self::obj_data_to_mesh(&data)
    }
}

impl ObjReader {
    /// Flatten every object and group of an OBJ file into one mesh.
    ///
    /// Texture and normal indices are ignored; polygons are fan-triangulated.
    pub fn obj_data_to_mesh(data: &ObjData) -> Result<TriangleMesh> {
        let vertices: Vec<Point3f> = data
            .position
            .iter()
            .map(|p| Point3f::new(p[0], p[1], p[2]))
            .collect();

        let mut faces = Vec::new();
        for object in &data.objects {
            for group in &object.groups {
                for SimplePolygon(corners) in &group.polys {
                    if corners.len() < 3 {
                        continue;
                    }
                    let first = corners[0].0;
                    for pair in corners[1..].windows(2) {
                        faces.push([first, pair[0].0, pair[1].0]);
                    }
                }
            }
        }

        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        mesh.validate()?;
        Ok(mesh)
    }
}

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        mesh.validate()?;

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        for v in &mesh.vertices {
            writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
        }
        if let Some(normals) = &mesh.normals {
            for n in normals {
                writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
            }
            for f in &mesh.faces {
                writeln!(
                    writer,
                    "f {a}//{a} {b}//{b} {c}//{c}",
                    a = f[0] + 1,
                    b = f[1] + 1,
                    c = f[2] + 1
                )?;
            }
        } else {
            for f in &mesh.faces {
                writeln!(writer, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}
