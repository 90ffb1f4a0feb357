use super::*;
use crate::foundation::core::HOST_IDENTITY;

#[test]
fn light_position_is_negated_world_translation() {
    let mut matrix_world = HOST_IDENTITY;
    matrix_world[0][3] = 1.0;
    matrix_world[1][3] = -2.0;
    matrix_world[2][3] = 3.5;
    let state = translate_light(&HostLight { matrix_world });
    assert_eq!(state.position, [-1.0, 2.0, -3.5]);
}

#[test]
fn rotation_does_not_affect_position() {
    let matrix_world = [
        [0.0, -1.0, 0.0, 4.0],
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];
    assert_eq!(
        translate_light(&HostLight { matrix_world }).position,
        [-4.0, -0.0, -0.0]
    );
}
