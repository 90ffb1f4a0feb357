use super::*;
use crate::foundation::core::HOST_IDENTITY;

fn counting() -> HostMatrix {
    let mut m = [[0.0; 4]; 4];
    for (r, row) in m.iter_mut().enumerate() {
        for (c, v) in row.iter_mut().enumerate() {
            *v = (4 * r + c + 1) as f32;
        }
    }
    m
}

#[test]
fn identity_stays_identity() {
    let out = to_engine_matrix(&HOST_IDENTITY);
    let expected = [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        -0.0, -0.0, 0.0, 1.0,
    ];
    assert_eq!(out, expected);
}

#[test]
fn columns_swap_rows_one_and_two_and_negate_translation_xy() {
    let out = to_engine_matrix(&counting());
    assert_eq!(
        out,
        [
            1.0, 9.0, 5.0, 13.0, //
            2.0, 10.0, 6.0, 14.0, //
            3.0, 11.0, 7.0, 15.0, //
            -4.0, -12.0, 8.0, 16.0,
        ]
    );
}

#[test]
fn pure_translation_lands_in_last_column() {
    let mut m = HOST_IDENTITY;
    m[0][3] = 1.0;
    m[1][3] = 2.0;
    m[2][3] = 3.0;
    let out = to_engine_matrix(&m);
    assert_eq!(&out[12..], &[-1.0, -3.0, 2.0, 1.0]);
}
