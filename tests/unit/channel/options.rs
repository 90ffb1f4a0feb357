use super::*;

#[test]
fn minimal_options_launch_the_fragment_shader() {
    let opts = ViewerOptions::new("main.frag");
    assert_eq!(opts.to_argv(), vec!["glslViewer", "main.frag"]);
    assert!(opts.validate().is_ok());
}

#[test]
fn argv_follows_flag_order() {
    let mut opts = ViewerOptions::new("shader.frag");
    opts.geometry = Some("bunny.ply".into());
    opts.vertex = Some("shader.vert".into());
    opts.headless = true;
    opts.cursor = Some(false);
    opts.size = Some(512);
    opts.width = Some(100);
    opts.defines = vec!["USE_FOG".into()];
    opts.include_folders = vec!["lygia".into()];
    opts.textures.insert("u_tex0".into(), "a.png".into());
    opts.textures_vflipped.insert("u_tex1".into(), "b.png".into());

    assert_eq!(
        opts.to_argv(),
        vec![
            "glslViewer",
            "bunny.ply",
            "shader.vert",
            "shader.frag",
            "--headless",
            "--nocursor",
            "--width",
            "512",
            "--height",
            "512",
            "-DUSE_FOG",
            "-Ilygia",
            "-u_tex0",
            "a.png",
            "-vFlip",
            "-u_tex1",
            "b.png",
        ]
    );
}

#[test]
fn explicit_width_height_without_size() {
    let mut opts = ViewerOptions::new("a.frag");
    opts.program = Some("/opt/gv/glslViewer".into());
    opts.width = Some(640);
    opts.height = Some(480);
    opts.x = Some(10);
    assert_eq!(
        opts.to_argv(),
        vec![
            "/opt/gv/glslViewer",
            "a.frag",
            "-x",
            "10",
            "--width",
            "640",
            "--height",
            "480",
        ]
    );
}

#[test]
fn validation_rejects_zero_sizes_and_missing_fragment() {
    assert!(ViewerOptions::default().validate().is_err());
    let mut opts = ViewerOptions::new("a.frag");
    opts.size = Some(0);
    assert!(opts.validate().is_err());
}

#[test]
fn uniform_values_deserialize_in_every_shape() {
    let json = r#"{
        "fragment": "a.frag",
        "uniforms": {
            "u_scalar": 0.5,
            "u_vec": [1.0, 2.0],
            "u_count": { "type": "int", "value": 3.9 },
            "u_gain": { "type": "float", "value": 0.25 }
        }
    }"#;
    let opts: ViewerOptions = serde_json::from_str(json).unwrap();
    assert_eq!(opts.uniforms["u_scalar"].components(), vec![0.5]);
    assert_eq!(opts.uniforms["u_vec"].components(), vec![1.0, 2.0]);
    assert_eq!(opts.uniforms["u_count"].components(), vec![3.0]);
    assert_eq!(opts.uniforms["u_gain"].components(), vec![0.25]);
}
