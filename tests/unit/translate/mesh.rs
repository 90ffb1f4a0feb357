use super::*;
use crate::host::Corner;

fn triangle(with_uvs: bool) -> HostMesh {
    let up = [0.0, 0.0, 1.0];
    HostMesh {
        points: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        point_normals: vec![up; 3],
        custom_normals: None,
        corners: (0..3).map(|point| Corner { point, normal: up }).collect(),
        triangles: vec![[0, 1, 2]],
        corner_colors: Some(vec![[1.0, 0.0, 0.0, 1.0]; 3]),
        corner_uvs: with_uvs.then(|| vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
    }
}

#[test]
fn triangle_corners_are_negated_and_sequentially_indexed() {
    let mesh = translate_mesh(&triangle(false)).unwrap();
    assert_eq!(mesh.draw_mode(), DrawMode::Triangles);
    assert_eq!(mesh.indices(), &[0, 1, 2]);
    assert_eq!(
        mesh.positions(),
        &[[-0.0, -0.0, -0.0], [-1.0, -0.0, -0.0], [-0.0, -1.0, -0.0]]
    );
    assert!(mesh.normals().iter().all(|n| *n == [-0.0, -0.0, -1.0]));
    assert_eq!(mesh.colors().map(<[_]>::len), Some(3));
    assert!(mesh.uvs().is_none());
    assert!(mesh.tangents().is_none());
}

#[test]
fn uvs_pass_through_and_produce_tangents() {
    let mesh = translate_mesh(&triangle(true)).unwrap();
    assert_eq!(mesh.uvs().unwrap()[1], [1.0, 0.0]);

    let tangents = mesh.tangents().unwrap();
    assert_eq!(tangents.len(), 3);
    for t in tangents {
        assert!((t[0] + 1.0).abs() < 1e-6, "{t:?}");
        assert!(t[1].abs() < 1e-6 && t[2].abs() < 1e-6, "{t:?}");
        assert_eq!(t[3], -1.0);
    }
}

#[test]
fn degenerate_uvs_give_zero_tangents() {
    let mut host = triangle(true);
    host.corner_uvs = Some(vec![[0.5, 0.5]; 3]);
    let mesh = translate_mesh(&host).unwrap();
    assert!(
        mesh.tangents()
            .unwrap()
            .iter()
            .all(|t| t[0] == 0.0 && t[1] == 0.0 && t[2] == 0.0)
    );
}

#[test]
fn mesh_without_faces_becomes_point_cloud_preferring_custom_normals() {
    let host = HostMesh {
        points: vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
        point_normals: vec![[0.0, 0.0, 1.0]; 2],
        custom_normals: Some(vec![[1.0, 0.0, 0.0]; 2]),
        ..HostMesh::default()
    };
    let mesh = translate_mesh(&host).unwrap();
    assert_eq!(mesh.draw_mode(), DrawMode::Points);
    assert_eq!(mesh.vertex_count(), 2);
    assert_eq!(mesh.positions()[0], [-1.0, -2.0, -3.0]);
    assert_eq!(mesh.normals()[1], [-1.0, -0.0, -0.0]);
    assert!(mesh.indices().is_empty());
}

#[test]
fn out_of_range_indices_are_translation_errors() {
    let mut host = triangle(false);
    host.triangles = vec![[0, 1, 7]];
    assert!(matches!(
        translate_mesh(&host),
        Err(BridgeError::Translation(_))
    ));

    let mut host = triangle(false);
    host.corners[2].point = 42;
    assert!(translate_mesh(&host).is_err());
}

#[test]
fn attribute_length_mismatch_is_rejected() {
    let mut host = triangle(true);
    host.corner_uvs = Some(vec![[0.0, 0.0]]);
    assert!(translate_mesh(&host).is_err());

    let host = HostMesh {
        points: vec![[0.0; 3]; 2],
        point_normals: vec![[0.0; 3]; 1],
        ..HostMesh::default()
    };
    assert!(translate_mesh(&host).is_err());
}
