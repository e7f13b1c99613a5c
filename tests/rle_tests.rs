use torus_life::parse_rle;
use torus_life::pattern::Pattern;
use torus_life::pattern::Preset;

#[test]
fn test_patterns() -> anyhow::Result<()> {
    let pattern_dir = std::fs::read_dir("tests/rle_pats")?;
    let mut tested = 0;
    let mut failed = Vec::new();

    for entry in pattern_dir {
        let path = entry?.path();
        let bytes = std::fs::read(&path)?;

        match parse_rle::read_rle(&bytes, |_row, _col| {}) {
            Ok(_) => tested += 1,
            Err(e) => failed.push((path.clone(), e)),
        }
    }

    if !failed.is_empty() {
        for (path, err) in &failed {
            eprintln!("Failed to parse {:?}: {:#}", path, err);
        }

        panic!(
            "{}/{} patterns failed to parse",
            failed.len(),
            tested + failed.len()
        );
    }

    assert!(tested > 0, "no patterns found");

    Ok(())
}

#[test]
fn test_pattern_contents() -> anyhow::Result<()> {
    let expected = [
        ("acorn", "Acorn", (3, 7), 7),
        ("diehard", "Diehard", (3, 8), 7),
        ("glider", "Glider", (3, 3), 5),
        ("lwss", "Lightweight spaceship", (4, 5), 9),
        ("pentadecathlon", "Pentadecathlon", (3, 10), 12),
        ("r_pentomino", "R-pentomino", (3, 3), 5),
    ];

    for (file, name, size, population) in expected {
        let bytes = std::fs::read(format!("tests/rle_pats/{file}.rle"))?;
        let pattern = Pattern::from_rle(&bytes)?;

        assert_eq!(pattern.name(), name, "{file}");
        assert_eq!((pattern.rows(), pattern.cols()), size, "{file}");
        assert_eq!(pattern.population(), population, "{file}");
    }

    Ok(())
}

#[test]
fn test_glider_file_matches_preset() -> anyhow::Result<()> {
    let bytes = std::fs::read("tests/rle_pats/glider.rle")?;
    let from_file = Pattern::from_rle(&bytes)?;
    let preset = Preset::Glider.pattern();

    assert_eq!(from_file.cells(), preset.cells());

    Ok(())
}
