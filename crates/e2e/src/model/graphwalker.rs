//! GraphWalker model files
//!
//! Reads the JSON format GraphWalker and AltWalker share and resolves every
//! vertex and edge by name against [`ModelState`] and [`Transition`]. An
//! element the fixture does not implement is an error at load time rather
//! than halfway through a walk.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::model::{Edge, Guard, ModelGraph, ModelState, Transition};

/// A model file: one or more models and an optional walk seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphWalkerFile {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    pub models: Vec<GraphWalkerModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphWalkerModel {
    pub name: String,

    #[serde(default)]
    pub generator: Option<String>,

    #[serde(rename = "startElementId")]
    pub start_element_id: String,

    #[serde(default)]
    pub vertices: Vec<GraphWalkerVertex>,

    #[serde(default)]
    pub edges: Vec<GraphWalkerEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphWalkerVertex {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphWalkerEdge {
    pub id: String,
    pub name: String,

    /// Absent on a start edge that enters the model from nowhere
    #[serde(rename = "sourceVertexId", default, skip_serializing_if = "Option::is_none")]
    pub source_vertex_id: Option<String>,

    #[serde(rename = "targetVertexId")]
    pub target_vertex_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,
}

impl GraphWalkerFile {
    pub fn from_json(json: &str) -> E2eResult<Self> {
        serde_json::from_str(json).map_err(E2eError::from)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load every `*.json` model file under `dir`
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut files = Vec::new();

        for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.path().extension().map(|ext| ext == "json").unwrap_or(false) {
                continue;
            }
            debug!("Loading model file {}", entry.path().display());
            files.push(Self::from_file(entry.path())?);
        }

        Ok(files)
    }

    /// Resolve and check every model in the file
    pub fn graphs(&self) -> E2eResult<Vec<ModelGraph>> {
        self.models
            .iter()
            .map(|model| {
                let graph = model.to_graph()?;
                graph.check()?;
                Ok(graph)
            })
            .collect()
    }

    /// The model called `name`
    pub fn graph(&self, name: &str) -> E2eResult<ModelGraph> {
        self.models
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| E2eError::InvalidModel(format!("no model named '{}'", name)))?
            .to_graph()
    }

    /// Write `graphs` out as a model file
    pub fn from_graphs(seed: Option<u64>, graphs: &[ModelGraph]) -> Self {
        Self {
            name: None,
            seed,
            models: graphs.iter().map(GraphWalkerModel::from_graph).collect(),
        }
    }
}

impl GraphWalkerModel {
    pub fn to_graph(&self) -> E2eResult<ModelGraph> {
        let mut vertices = HashMap::new();
        for vertex in &self.vertices {
            let state = ModelState::from_name(&vertex.name)
                .ok_or_else(|| E2eError::UnknownModelElement(vertex.name.clone()))?;
            vertices.insert(vertex.id.as_str(), state);
        }

        let lookup = |id: &str| {
            vertices.get(id).copied().ok_or_else(|| {
                E2eError::InvalidModel(format!("model '{}': no vertex with id '{}'", self.name, id))
            })
        };

        let mut edges = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            let transition = Transition::from_name(&edge.name)
                .ok_or_else(|| E2eError::UnknownModelElement(edge.name.clone()))?;
            let from = match &edge.source_vertex_id {
                Some(id) => lookup(id)?,
                None if edge.id == self.start_element_id => ModelState::Start,
                None => {
                    return Err(E2eError::InvalidModel(format!(
                        "model '{}': edge '{}' has no source and is not the start element",
                        self.name, edge.id
                    )))
                }
            };
            let to = lookup(&edge.target_vertex_id)?;
            let guard = Guard::from_expr(edge.guard.as_deref().unwrap_or_default())?;
            edges.push(Edge::guarded(from, transition, to, guard));
        }

        let start = if let Some(state) = vertices.get(self.start_element_id.as_str()) {
            *state
        } else if let Some(edge) = self.edges.iter().find(|e| e.id == self.start_element_id) {
            match &edge.source_vertex_id {
                Some(id) => lookup(id)?,
                None => ModelState::Start,
            }
        } else {
            return Err(E2eError::InvalidModel(format!(
                "model '{}': start element '{}' not found",
                self.name, self.start_element_id
            )));
        };

        Ok(ModelGraph {
            name: self.name.clone(),
            start,
            edges,
        })
    }

    pub fn from_graph(graph: &ModelGraph) -> Self {
        let states: Vec<ModelState> = graph.states().into_iter().collect();
        let vertex_id = |state: ModelState| {
            let index = states.iter().position(|s| *s == state).unwrap_or_default();
            format!("v{}", index)
        };

        Self {
            name: graph.name.clone(),
            generator: Some("random(edge_coverage(100))".to_string()),
            start_element_id: vertex_id(graph.start),
            vertices: states
                .iter()
                .map(|s| GraphWalkerVertex {
                    id: vertex_id(*s),
                    name: s.name().to_string(),
                })
                .collect(),
            edges: graph
                .edges
                .iter()
                .enumerate()
                .map(|(i, e)| GraphWalkerEdge {
                    id: format!("e{}", i),
                    name: e.transition.name().to_string(),
                    source_vertex_id: Some(vertex_id(e.from)),
                    target_vertex_id: vertex_id(e.to),
                    guard: e.guard.expr().map(str::to_string),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelKind;
    use std::collections::BTreeSet;

    const SHIPPED: &str = include_str!("../../models/booker.json");

    fn edge_set(graph: &ModelGraph) -> BTreeSet<Edge> {
        graph.edges.iter().copied().collect()
    }

    #[test]
    fn test_shipped_models_match_builtin() {
        let file = GraphWalkerFile::from_json(SHIPPED).unwrap();
        assert_eq!(file.seed, Some(1234));
        for kind in ModelKind::ALL {
            let loaded = file.graph(kind.name()).unwrap();
            let builtin = kind.graph();
            assert_eq!(loaded.start, builtin.start, "{}", kind.name());
            assert_eq!(edge_set(&loaded), edge_set(&builtin), "{}", kind.name());
        }
        assert_eq!(file.graphs().unwrap().len(), ModelKind::ALL.len());
    }

    #[test]
    fn test_export_then_load() {
        let graphs: Vec<ModelGraph> = ModelKind::ALL.iter().map(|k| k.graph()).collect();
        let json = serde_json::to_string(&GraphWalkerFile::from_graphs(Some(9), &graphs)).unwrap();
        let file = GraphWalkerFile::from_json(&json).unwrap();
        assert_eq!(file.seed, Some(9));
        for (loaded, original) in file.graphs().unwrap().iter().zip(&graphs) {
            assert_eq!(edge_set(loaded), edge_set(original));
        }
    }

    #[test]
    fn test_start_edge_without_source() {
        let json = r#"{
            "models": [{
                "name": "Tiny",
                "startElementId": "e0",
                "vertices": [{"id": "v1", "name": "v_frontpage_can_contact"}],
                "edges": [
                    {"id": "e0", "name": "e_load_frontpage", "targetVertexId": "v1"},
                    {"id": "e1", "name": "e_load_frontpage", "sourceVertexId": "v1", "targetVertexId": "v1"}
                ]
            }]
        }"#;
        let graph = GraphWalkerFile::from_json(json).unwrap().graph("Tiny").unwrap();
        assert_eq!(graph.start, ModelState::Start);
        assert_eq!(graph.edges[0].from, ModelState::Start);
        graph.check().unwrap();
    }

    #[test]
    fn test_unknown_element_rejected() {
        let json = r#"{
            "models": [{
                "name": "Bad",
                "startElementId": "v0",
                "vertices": [{"id": "v0", "name": "v_start"}, {"id": "v1", "name": "v_somewhere"}],
                "edges": []
            }]
        }"#;
        let err = GraphWalkerFile::from_json(json).unwrap().graph("Bad").unwrap_err();
        assert!(matches!(err, E2eError::UnknownModelElement(name) if name == "v_somewhere"));
    }

    #[test]
    fn test_load_all_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("booker.json"), SHIPPED).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a model").unwrap();
        let files = GraphWalkerFile::load_all(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_load_all_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GraphWalkerFile::load_all(&dir.path().join("models")).unwrap_err();
        assert!(matches!(err, E2eError::Io(_)));
    }
}
