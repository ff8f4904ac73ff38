//! PLY format support

use crate::{PointCloudReader, PointCloudWriter};
use facetscan_core::{ColoredPoint3f, Error, Point3f, PointCloud, Result};
use ply_rs::{
    parser::Parser,
    ply::{Addable, DefaultElement, ElementDef, Ply, Property, PropertyDef, PropertyType, ScalarType},
    writer::Writer,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub struct PlyReader;
pub struct PlyWriter;

/// Options for PLY output
#[derive(Debug, Clone, Default)]
pub struct PlyWriteOptions {
    pub comments: Vec<String>,
}

impl PlyWriteOptions {
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comments.push(comment.to_string());
        self
    }
}

fn extract_property_value(vertex: &DefaultElement, name: &str) -> Result<f32> {
    match vertex.get(name) {
        Some(Property::Float(v)) => Ok(*v),
        Some(Property::Double(v)) => Ok(*v as f32),
        Some(Property::Int(v)) => Ok(*v as f32),
        Some(Property::UInt(v)) => Ok(*v as f32),
        Some(Property::UChar(v)) => Ok(*v as f32),
        _ => Err(Error::InvalidData(format!(
            "missing or non-scalar vertex property '{}'",
            name
        ))),
    }
}

fn extract_color_component(vertex: &DefaultElement, name: &str) -> Option<u8> {
    match vertex.get(name) {
        Some(Property::UChar(v)) => Some(*v),
        Some(Property::Int(v)) => Some((*v).clamp(0, 255) as u8),
        _ => None,
    }
}

impl PointCloudReader for PlyReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let mut points = Vec::new();

        if let Some(vertex_element) = ply.payload.get("vertex") {
            for vertex in vertex_element {
                let x = extract_property_value(vertex, "x")?;
                let y = extract_property_value(vertex, "y")?;
                let z = extract_property_value(vertex, "z")?;

                points.push(Point3f::new(x, y, z));
            }
        }

        Ok(PointCloud::from_points(points))
    }
}

impl PlyReader {
    /// Read a colored point cloud; vertices without red/green/blue
    /// properties default to white
    pub fn read_colored_point_cloud<P: AsRef<Path>>(
        path: P,
    ) -> Result<PointCloud<ColoredPoint3f>> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let mut points = Vec::new();

        if let Some(vertex_element) = ply.payload.get("vertex") {
            for vertex in vertex_element {
                let x = extract_property_value(vertex, "x")?;
                let y = extract_property_value(vertex, "y")?;
                let z = extract_property_value(vertex, "z")?;

                let color = [
                    extract_color_component(vertex, "red").unwrap_or(255),
                    extract_color_component(vertex, "green").unwrap_or(255),
                    extract_color_component(vertex, "blue").unwrap_or(255),
                ];

                points.push(ColoredPoint3f::new(Point3f::new(x, y, z), color));
            }
        }

        Ok(PointCloud::from_points(points))
    }
}

fn position_properties() -> Vec<PropertyDef> {
    ["x", "y", "z"]
        .iter()
        .map(|name| {
            PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::Float),
            )
        })
        .collect()
}

fn color_properties() -> Vec<PropertyDef> {
    ["red", "green", "blue"]
        .iter()
        .map(|name| {
            PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::UChar),
            )
        })
        .collect()
}

impl PointCloudWriter for PlyWriter {
    fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud<Point3f>, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();

        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = cloud.len();
        for property in position_properties() {
            vertex_element.properties.add(property);
        }
        ply.header.elements.add(vertex_element);

        let mut vertices = Vec::with_capacity(cloud.len());
        for point in &cloud.points {
            let mut vertex = DefaultElement::new();
            vertex.insert("x".to_string(), Property::Float(point.x));
            vertex.insert("y".to_string(), Property::Float(point.y));
            vertex.insert("z".to_string(), Property::Float(point.z));
            vertices.push(vertex);
        }
        ply.payload.insert("vertex".to_string(), vertices);

        let ply_writer = Writer::new();
        ply_writer.write_ply(&mut writer, &mut ply)?;

        Ok(())
    }
}

impl PlyWriter {
    /// Write a colored point cloud with per-vertex red/green/blue properties
    pub fn write_colored_point_cloud<P: AsRef<Path>>(
        cloud: &PointCloud<ColoredPoint3f>,
        path: P,
    ) -> Result<()> {
        Self::write_colored_point_cloud_with_options(cloud, path, &PlyWriteOptions::default())
    }

    pub fn write_colored_point_cloud_with_options<P: AsRef<Path>>(
        cloud: &PointCloud<ColoredPoint3f>,
        path: P,
        options: &PlyWriteOptions,
    ) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();
        ply.header.comments = options.comments.clone();

        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = cloud.len();
        for property in position_properties() {
            vertex_element.properties.add(property);
        }
        for property in color_properties() {
            vertex_element.properties.add(property);
        }
        ply.header.elements.add(vertex_element);

        let mut vertices = Vec::with_capacity(cloud.len());
        for point in &cloud.points {
            let mut vertex = DefaultElement::new();
            vertex.insert("x".to_string(), Property::Float(point.position.x));
            vertex.insert("y".to_string(), Property::Float(point.position.y));
            vertex.insert("z".to_string(), Property::Float(point.position.z));
            vertex.insert("red".to_string(), Property::UChar(point.color[0]));
            vertex.insert("green".to_string(), Property::UChar(point.color[1]));
            vertex.insert("blue".to_string(), Property::UChar(point.color[2]));
            vertices.push(vertex);
        }
        ply.payload.insert("vertex".to_string(), vertices);

        let ply_writer = Writer::new();
        ply_writer.write_ply(&mut writer, &mut ply)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_colored_roundtrip() {
        let temp_file = "test_ply_colored.ply";

        let cloud = PointCloud::from_points(vec![
            ColoredPoint3f::new(Point3f::new(0.0, 0.0, 10.0), [255, 0, 0]),
            ColoredPoint3f::new(Point3f::new(1.0, 0.0, 0.0), [0, 0, 255]),
        ]);

        PlyWriter::write_colored_point_cloud(&cloud, temp_file).unwrap();
        let loaded = PlyReader::read_colored_point_cloud(temp_file).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].color, [255, 0, 0]);
        assert_eq!(loaded[1].color, [0, 0, 255]);
        assert!((loaded[0].position.z - 10.0).abs() < 1e-6);

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_plain_reader_on_colored_file() {
        let temp_file = "test_ply_plain_on_colored.ply";

        let cloud = PointCloud::from_points(vec![ColoredPoint3f::new(
            Point3f::new(2.0, 3.0, 4.0),
            [0, 255, 0],
        )]);

        PlyWriter::write_colored_point_cloud(&cloud, temp_file).unwrap();
        let loaded = PlyReader::read_point_cloud(temp_file).unwrap();

        assert_eq!(loaded.len(), 1);
        assert!((loaded[0].x - 2.0).abs() < 1e-6);

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_reader_rejects_garbage() {
        let temp_file = "test_ply_garbage.ply";
        fs::write(temp_file, "not a ply file\n").unwrap();

        let result = PlyReader::read_point_cloud(temp_file);
        assert!(result.is_err());

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_write_options_comments() {
        let temp_file = "test_ply_comments.ply";

        let cloud = PointCloud::from_points(vec![ColoredPoint3f::default()]);
        let options = PlyWriteOptions::default().with_comment("classified by facetscan");
        PlyWriter::write_colored_point_cloud_with_options(&cloud, temp_file, &options).unwrap();

        let contents = fs::read_to_string(temp_file).unwrap();
        assert!(contents.contains("comment classified by facetscan"));

        let _ = fs::remove_file(temp_file);
    }
}
