use crate::animation::{AnimationClip, NodeProperty};
use glam::{Mat4, Vec3};
use modelview_common::Transform;
use std::collections::HashMap;
use std::fmt;

/// A node in the model's scene graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneNode {
    /// Index of this node in the source document. Animation channels and
    /// skin joints refer to nodes by this index.
    pub index: usize,
    pub name: Option<String>,
    /// Transform relative to the parent node.
    pub transform: Transform,
    /// Index into [`ModelAsset::meshes`].
    pub mesh: Option<usize>,
    /// Index into [`ModelAsset::skins`].
    pub skin: Option<usize>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    fn count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::count).sum::<usize>()
    }

    fn visit<F: FnMut(&SceneNode, Mat4)>(&self, parent: Mat4, f: &mut F) {
        let world = parent * self.transform.to_matrix();
        f(self, world);
        for child in &self.children {
            child.visit(world, f);
        }
    }

    fn find_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        if self.index == index {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(index))
    }
}

/// A mesh placed in the scene by one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshInstance {
    pub mesh: usize,
    /// Skinned meshes ignore `world`: their vertices are placed by joints.
    pub skin: Option<usize>,
    /// The node's world matrix relative to the scene root.
    pub world: Mat4,
}

/// The default scene of a model: a forest of root nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub name: Option<String>,
    pub roots: Vec<SceneNode>,
}

impl Scene {
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(SceneNode::count).sum()
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        self.roots.iter_mut().find_map(|r| r.find_mut(index))
    }

    /// Overwrite one component of a node's local transform.
    /// Returns `false` when no node has that index.
    pub fn set_node_property(&mut self, index: usize, property: NodeProperty) -> bool {
        let Some(node) = self.node_mut(index) else {
            return false;
        };
        match property {
            NodeProperty::Translation(v) => node.transform.position = v,
            NodeProperty::Rotation(q) => node.transform.rotation = q,
            NodeProperty::Scale(v) => node.transform.scale = v,
        }
        true
    }

    /// World matrix of every node, keyed by node index.
    pub fn node_worlds(&self) -> HashMap<usize, Mat4> {
        let mut worlds = HashMap::new();
        for root in &self.roots {
            root.visit(Mat4::IDENTITY, &mut |node, world| {
                worlds.insert(node.index, world);
            });
        }
        worlds
    }

    /// Every mesh reference in the scene, in depth-first order.
    pub fn mesh_instances(&self) -> Vec<MeshInstance> {
        let mut out = Vec::new();
        for root in &self.roots {
            root.visit(Mat4::IDENTITY, &mut |node, world| {
                if let Some(mesh) = node.mesh {
                    out.push(MeshInstance {
                        mesh,
                        skin: node.skin,
                        world,
                    });
                }
            });
        }
        out
    }
}

/// Joint list of a skinned mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skin {
    /// Node indices of the joints, in the order vertex `JOINTS_0` refers to.
    pub joints: Vec<usize>,
    /// One per joint. Missing entries are identity.
    pub inverse_bind: Vec<Mat4>,
}

impl Skin {
    /// `joint world * inverse bind` for each joint under the given pose.
    pub fn joint_matrices(&self, worlds: &HashMap<usize, Mat4>) -> Vec<Mat4> {
        self.joints
            .iter()
            .enumerate()
            .map(|(i, joint)| {
                let world = worlds.get(joint).copied().unwrap_or(Mat4::IDENTITY);
                let inverse_bind = self.inverse_bind.get(i).copied().unwrap_or(Mat4::IDENTITY);
                world * inverse_bind
            })
            .collect()
    }
}

/// Triangle-list geometry for one draw call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Primitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
    /// Per-vertex joint indices; empty for rigid geometry.
    pub joints: Vec<[u16; 4]>,
    /// Per-vertex joint weights, parallel to `joints`.
    pub weights: Vec<[f32; 4]>,
}

impl Primitive {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_skinned(&self) -> bool {
        !self.joints.is_empty()
    }

    /// Positions and normals deformed by linear blend skinning.
    /// Vertices with no usable weight keep their bind pose.
    pub fn skinned(&self, joint_matrices: &[Mat4]) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
        let mut positions = Vec::with_capacity(self.positions.len());
        let mut normals = Vec::with_capacity(self.normals.len());
        for (i, (p, n)) in self.positions.iter().zip(&self.normals).enumerate() {
            let (joints, weights) = match (self.joints.get(i), self.weights.get(i)) {
                (Some(j), Some(w)) => (j, w),
                _ => {
                    positions.push(*p);
                    normals.push(*n);
                    continue;
                }
            };
            let mut blended = Mat4::ZERO;
            let mut total = 0.0;
            for (joint, &weight) in joints.iter().zip(weights) {
                if weight <= 0.0 {
                    continue;
                }
                if let Some(m) = joint_matrices.get(*joint as usize) {
                    blended = blended + *m * weight;
                    total += weight;
                }
            }
            if total <= 0.0 {
                blended = Mat4::IDENTITY;
            }
            positions.push(blended.transform_point3(Vec3::from_array(*p)).to_array());
            let normal = blended.transform_vector3(Vec3::from_array(*n));
            normals.push(normal.normalize_or_zero().to_array());
        }
        (positions, normals)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

/// A fully loaded model.
#[derive(Debug, Clone, Default)]
pub struct ModelAsset {
    pub scene: Scene,
    pub meshes: Vec<MeshData>,
    pub skins: Vec<Skin>,
    pub animations: Vec<AnimationClip>,
    /// SHA-256 of the model document, hex encoded.
    pub digest: String,
}

impl ModelAsset {
    /// Joint matrices of every skin under the scene's current pose.
    pub fn joint_matrices(&self) -> Vec<Vec<Mat4>> {
        if self.skins.is_empty() {
            return Vec::new();
        }
        let worlds = self.scene.node_worlds();
        self.skins.iter().map(|s| s.joint_matrices(&worlds)).collect()
    }

    pub fn summary(&self) -> ModelSummary {
        let primitives = self.meshes.iter().flat_map(|m| m.primitives.iter());
        let (mut vertices, mut triangles, mut primitive_count) = (0, 0, 0);
        for p in primitives {
            vertices += p.positions.len();
            triangles += p.triangle_count();
            primitive_count += 1;
        }
        ModelSummary {
            nodes: self.scene.node_count(),
            meshes: self.meshes.len(),
            primitives: primitive_count,
            vertices,
            triangles,
            skins: self.skins.len(),
            animations: self
                .animations
                .iter()
                .map(|a| (a.name.clone(), a.duration))
                .collect(),
            digest: self.digest.clone(),
        }
    }
}

/// Counts describing a model, for logs and tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub nodes: usize,
    pub meshes: usize,
    pub primitives: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub skins: usize,
    pub animations: Vec<(String, f32)>,
    pub digest: String,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Model: nodes={} meshes={} primitives={} vertices={} triangles={} skins={}",
            self.nodes, self.meshes, self.primitives, self.vertices, self.triangles, self.skins
        )?;
        for (name, duration) in &self.animations {
            writeln!(f, "  animation {name:?}: {duration:.2}s")?;
        }
        write!(f, "  sha256 {}", self.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn node(index: usize, x: f32, mesh: Option<usize>, children: Vec<SceneNode>) -> SceneNode {
        SceneNode {
            index,
            name: Some(format!("n{index}")),
            transform: Transform {
                position: Vec3::new(x, 0.0, 0.0),
                ..Transform::default()
            },
            mesh,
            skin: None,
            children,
        }
    }

    fn chain() -> Scene {
        Scene {
            name: None,
            roots: vec![node(
                0,
                1.0,
                None,
                vec![node(1, 2.0, Some(0), vec![node(2, 3.0, Some(1), vec![])])],
            )],
        }
    }

    #[test]
    fn world_matrices_compose_down_the_tree() {
        let scene = chain();
        assert_eq!(scene.node_count(), 3);

        let instances = scene.mesh_instances();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].mesh, 0);
        assert_eq!(instances[0].world.w_axis.x, 3.0);
        assert_eq!(instances[1].mesh, 1);
        assert_eq!(instances[1].world.w_axis.x, 6.0);
        assert_eq!(scene.node_worlds()[&2].w_axis.x, 6.0);
    }

    #[test]
    fn node_property_targets_nested_node() {
        let mut scene = chain();
        assert!(scene.set_node_property(2, NodeProperty::Translation(Vec3::new(10.0, 0.0, 0.0))));
        assert!(!scene.set_node_property(9, NodeProperty::Scale(Vec3::ZERO)));
        assert_eq!(scene.mesh_instances()[1].world.w_axis.x, 13.0);
    }

    #[test]
    fn skinning_follows_joint() {
        let mut scene = chain();
        let skin = Skin {
            joints: vec![1],
            // Bind pose: joint 1 sits at world x = 3.
            inverse_bind: vec![Mat4::from_translation(Vec3::new(-3.0, 0.0, 0.0))],
        };
        let prim = Primitive {
            positions: vec![[3.0, 1.0, 0.0], [0.0, 0.0, 0.0]],
            normals: vec![[0.0, 1.0, 0.0]; 2],
            indices: vec![],
            base_color: [1.0; 4],
            joints: vec![[0, 0, 0, 0], [0, 0, 0, 0]],
            weights: vec![[1.0, 0.0, 0.0, 0.0], [0.0; 4]],
        };

        let at_rest = skin.joint_matrices(&scene.node_worlds());
        let (positions, _) = prim.skinned(&at_rest);
        assert_eq!(positions[0], [3.0, 1.0, 0.0]);

        let turn = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        scene.set_node_property(1, NodeProperty::Rotation(turn));
        let posed = skin.joint_matrices(&scene.node_worlds());
        let (positions, normals) = prim.skinned(&posed);
        let moved = Vec3::from_array(positions[0]);
        assert!((moved - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5, "{moved}");
        assert!((Vec3::from_array(normals[0]) - Vec3::NEG_X).length() < 1e-5);
        // Zero weights leave the vertex in its bind pose.
        assert_eq!(positions[1], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn summary_counts_geometry() {
        let asset = ModelAsset {
            meshes: vec![MeshData {
                name: "tri".into(),
                primitives: vec![Primitive {
                    positions: vec![[0.0; 3]; 3],
                    normals: vec![[0.0, 0.0, 1.0]; 3],
                    indices: vec![0, 1, 2],
                    base_color: [1.0; 4],
                    ..Primitive::default()
                }],
            }],
            animations: vec![AnimationClip {
                name: "spin".into(),
                duration: 2.0,
                channels: vec![],
            }],
            digest: "abc".into(),
            ..ModelAsset::default()
        };
        let summary = asset.summary();
        assert_eq!(summary.vertices, 3);
        assert_eq!(summary.triangles, 1);
        assert_eq!(summary.primitives, 1);
        assert_eq!(summary.skins, 0);
        let text = summary.to_string();
        assert!(text.contains("\"spin\": 2.00s"));
        assert!(text.contains("sha256 abc"));
    }
}
