//! PLY format support
//!
//! PLY is also the interchange format used to move meshes between the value
//! representation and processing sessions, so the writer supports a binary
//! encoding that round-trips `f32` coordinates exactly.

use crate::{MeshReader, MeshWriter};
use meshpost_core::{Error, Point3f, Result, TriangleMesh, Vector3f};
use ply_rs::{
    parser::Parser,
    ply::{
        Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
        ScalarType,
    },
    writer::Writer,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub struct PlyReader;
pub struct PlyWriter;

/// PLY body encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlyFormat {
    #[default]
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl From<PlyFormat> for Encoding {
    fn from(format: PlyFormat) -> Self {
        match format {
            PlyFormat::Ascii => Encoding::Ascii,
            PlyFormat::BinaryLittleEndian => Encoding::BinaryLittleEndian,
            PlyFormat::BinaryBigEndian => Encoding::BinaryBigEndian,
        }
    }
}

/// Options controlling how meshes are written to PLY
#[derive(Debug, Clone)]
pub struct PlyWriteOptions {
    pub format: PlyFormat,
    /// Write per-vertex normals when the mesh has them
    pub include_normals: bool,
    /// Write per-vertex colors when the mesh has them
    pub include_colors: bool,
    pub comments: Vec<String>,
}

impl Default for PlyWriteOptions {
    fn default() -> Self {
        Self {
            format: PlyFormat::Ascii,
            include_normals: true,
            include_colors: true,
            comments: Vec::new(),
        }
    }
}

impl PlyWriteOptions {
    pub fn ascii() -> Self {
        Self::default()
    }

    pub fn binary_little_endian() -> Self {
        Self {
            format: PlyFormat::BinaryLittleEndian,
            ..Self::default()
        }
    }

    /// Positions and faces only
    pub fn geometry_only(mut self) -> Self {
        self.include_normals = false;
        self.include_colors = false;
        self
    }

    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comments.push(comment.into());
        self
    }
}

impl MeshReader for PlyReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut colors = Vec::new();
        let mut has_normals = true;
        let mut has_colors = true;

        if let Some(vertex_element) = ply.payload.get("vertex") {
            for vertex in vertex_element {
                let x = extract_property_value(vertex, "x")?;
                let y = extract_property_value(vertex, "y")?;
                let z = extract_property_value(vertex, "z")?;
                vertices.push(Point3f::new(x, y, z));

                if has_normals {
                    match (
                        extract_property_value(vertex, "nx"),
                        extract_property_value(vertex, "ny"),
                        extract_property_value(vertex, "nz"),
                    ) {
                        (Ok(nx), Ok(ny), Ok(nz)) => normals.push(Vector3f::new(nx, ny, nz)),
                        _ => has_normals = false,
                    }
                }

                if has_colors {
                    match (
                        extract_color_channel(vertex, "red"),
                        extract_color_channel(vertex, "green"),
                        extract_color_channel(vertex, "blue"),
                    ) {
                        (Some(r), Some(g), Some(b)) => colors.push([r, g, b]),
                        _ => has_colors = false,
                    }
                }
            }
        }

        let mut faces = Vec::new();
        if let Some(face_element) = ply.payload.get("face") {
            for face in face_element {
                let indices = extract_face_indices(face)?;
                triangulate_fan(&indices, &mut faces);
            }
        }

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if has_normals && !normals.is_empty() {
            mesh.set_normals(normals);
        }
        if has_colors && !colors.is_empty() {
            mesh.set_colors(colors);
        }
        mesh.validate()?;

        Ok(mesh)
    }
}

impl MeshWriter for PlyWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        Self::write_mesh_with_options(mesh, path, &PlyWriteOptions::default())
    }
}

impl PlyWriter {
    /// Write a mesh with explicit encoding and attribute options
    pub fn write_mesh_with_options<P: AsRef<Path>>(
        mesh: &TriangleMesh,
        path: P,
        options: &PlyWriteOptions,
    ) -> Result<()> {
        mesh.validate()?;

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = options.format.into();
        for comment in &options.comments {
            ply.header.comments.push(comment.clone());
        }

        let normals = mesh.normals.as_ref().filter(|_| options.include_normals);
        let colors = mesh.colors.as_ref().filter(|_| options.include_colors);

        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = mesh.vertices.len();
        for name in ["x", "y", "z"] {
            vertex_element.properties.add(PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::Float),
            ));
        }
        if normals.is_some() {
            for name in ["nx", "ny", "nz"] {
                vertex_element.properties.add(PropertyDef::new(
                    name.to_string(),
                    PropertyType::Scalar(ScalarType::Float),
                ));
            }
        }
        if colors.is_some() {
            for name in ["red", "green", "blue"] {
                vertex_element.properties.add(PropertyDef::new(
                    name.to_string(),
                    PropertyType::Scalar(ScalarType::UChar),
                ));
            }
        }
        ply.header.elements.add(vertex_element);

        let mut face_element = ElementDef::new("face".to_string());
        face_element.count = mesh.faces.len();
        face_element.properties.add(PropertyDef::new(
            "vertex_indices".to_string(),
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        ));
        ply.header.elements.add(face_element);

        let writer_instance = Writer::<DefaultElement>::new();
        match options.format {
            PlyFormat::Ascii => {
                ply.payload
                    .insert("vertex".to_string(), vertex_payload(mesh, normals, colors));
                ply.payload.insert("face".to_string(), face_payload(mesh)?);
                writer_instance.write_ply(&mut writer, &mut ply)?;
            }
            PlyFormat::BinaryLittleEndian | PlyFormat::BinaryBigEndian => {
                // ply-rs miscounts list lengths in binary bodies, so only the
                // header goes through it
                writer_instance.write_header(&mut writer, &ply.header)?;
                let order = if options.format == PlyFormat::BinaryBigEndian {
                    ByteOrder::Big
                } else {
                    ByteOrder::Little
                };
                write_binary_body(&mut writer, mesh, normals, colors, order)?;
            }
        }
        writer.flush()?;

        Ok(())
    }
}

fn vertex_payload(
    mesh: &TriangleMesh,
    normals: Option<&Vec<Vector3f>>,
    colors: Option<&Vec<[u8; 3]>>,
) -> Vec<DefaultElement> {
    let mut vertices = Vec::with_capacity(mesh.vertices.len());
    for (i, vertex) in mesh.vertices.iter().enumerate() {
        let mut element = DefaultElement::new();
        element.insert("x".to_string(), Property::Float(vertex.x));
        element.insert("y".to_string(), Property::Float(vertex.y));
        element.insert("z".to_string(), Property::Float(vertex.z));

        if let Some(normals) = normals {
            element.insert("nx".to_string(), Property::Float(normals[i].x));
            element.insert("ny".to_string(), Property::Float(normals[i].y));
            element.insert("nz".to_string(), Property::Float(normals[i].z));
        }
        if let Some(colors) = colors {
            element.insert("red".to_string(), Property::UChar(colors[i][0]));
            element.insert("green".to_string(), Property::UChar(colors[i][1]));
            element.insert("blue".to_string(), Property::UChar(colors[i][2]));
        }

        vertices.push(element);
    }
    vertices
}

fn face_payload(mesh: &TriangleMesh) -> Result<Vec<DefaultElement>> {
    let mut faces = Vec::with_capacity(mesh.faces.len());
    for face in &mesh.faces {
        let mut element = DefaultElement::new();
        let indices = face
            .iter()
            .map(|&idx| ply_index(idx))
            .collect::<Result<Vec<i32>>>()?;
        element.insert("vertex_indices".to_string(), Property::ListInt(indices));
        faces.push(element);
    }
    Ok(faces)
}

fn ply_index(idx: usize) -> Result<i32> {
    i32::try_from(idx)
        .map_err(|_| Error::InvalidData(format!("Vertex index {} exceeds PLY int range", idx)))
}

#[derive(Debug, Clone, Copy)]
enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn f32(self, value: f32) -> [u8; 4] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }

    fn i32(self, value: i32) -> [u8; 4] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }
}

/// Binary body matching the header written above: vertex records in
/// property order, then faces as a `uchar` count followed by `int` indices
fn write_binary_body<W: Write>(
    out: &mut W,
    mesh: &TriangleMesh,
    normals: Option<&Vec<Vector3f>>,
    colors: Option<&Vec<[u8; 3]>>,
    order: ByteOrder,
) -> Result<()> {
    for (i, vertex) in mesh.vertices.iter().enumerate() {
        for value in [vertex.x, vertex.y, vertex.z] {
            out.write_all(&order.f32(value))?;
        }
        if let Some(normals) = normals {
            let n = normals[i];
            for value in [n.x, n.y, n.z] {
                out.write_all(&order.f32(value))?;
            }
        }
        if let Some(colors) = colors {
            out.write_all(&colors[i])?;
        }
    }

    for face in &mesh.faces {
        out.write_all(&[3u8])?;
        for &idx in face {
            out.write_all(&order.i32(ply_index(idx)?))?;
        }
    }
    Ok(())
}

/// Split a polygon into a triangle fan around its first corner
fn triangulate_fan(indices: &[usize], faces: &mut Vec<[usize; 3]>) {
    if indices.len() < 3 {
        return;
    }
    for i in 1..indices.len() - 1 {
        faces.push([indices[0], indices[i], indices[i + 1]]);
    }
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        _ => Err(Error::InvalidData(format!(
            "Property '{}' not found or invalid type",
            name
        ))),
    }
}

fn extract_color_channel(element: &DefaultElement, name: &str) -> Option<u8> {
    match element.get(name) {
        Some(Property::UChar(val)) => Some(*val),
        Some(Property::Float(val)) => Some((val.clamp(0.0, 1.0) * 255.0).round() as u8),
        _ => None,
    }
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement) -> Result<Vec<usize>> {
    let to_index = |idx: i64| {
        usize::try_from(idx)
            .map_err(|_| Error::InvalidData(format!("Negative face index {}", idx)))
    };

    match element
        .get("vertex_indices")
        .or_else(|| element.get("vertex_index"))
    {
        Some(Property::ListInt(indices)) => {
            indices.iter().map(|&idx| to_index(idx as i64)).collect()
        }
        Some(Property::ListUInt(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListShort(indices)) => {
            indices.iter().map(|&idx| to_index(idx as i64)).collect()
        }
        Some(Property::ListUShort(indices)) => {
            Ok(indices.iter().map(|&idx| idx as usize).collect())
        }
        Some(Property::ListUChar(indices)) => {
            Ok(indices.iter().map(|&idx| idx as usize).collect())
        }
        _ => Err(Error::InvalidData("Face indices not found".to_string())),
    }
}
