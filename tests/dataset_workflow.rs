use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use image_dataset_prep::core::{partition, validate, ValidExtensions};
use image_dataset_prep::{partition_with_rng, PartitionOptions, RealFs, SplitRatio, TransferMode};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn write_jpeg(path: &Path, shade: u8) {
    RgbImage::from_pixel(8, 8, Rgb([shade, shade, shade]))
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    if !dir.is_dir() {
        return BTreeSet::new();
    }
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

/// root/cats (7 jpegs), root/dogs (4 jpegs), root/empty, plus noise
fn build_dataset(root: &Path) {
    for (class, count) in [("cats", 7u8), ("dogs", 4u8)] {
        let dir = root.join(class);
        fs::create_dir_all(&dir).unwrap();
        for i in 0..count {
            write_jpeg(&dir.join(format!("{}_{}.jpg", class, i)), i * 20);
        }
    }
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::create_dir_all(root.join(".ipynb_checkpoints")).unwrap();
    fs::write(root.join("notes.md"), "not a class").unwrap();
}

#[test]
fn validator_flags_wrong_extension_and_corrupt_content() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    build_dataset(root);
    fs::write(root.join("cats").join("sample.txt"), "hello").unwrap();
    fs::write(root.join("dogs").join("sample.jpg"), "not jpeg bytes").unwrap();

    let exts = ValidExtensions::default();
    let report = validate(root, &exts, false).unwrap();
    let found: BTreeSet<_> = report.pairs().into_iter().collect();
    let expected: BTreeSet<_> = [
        ("sample.txt".to_string(), "cats".to_string()),
        ("sample.jpg".to_string(), "dogs".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(found, expected);
    assert_eq!(report.scanned, 13);

    // dry run leaves everything on disk, and says the same thing twice
    assert!(root.join("cats").join("sample.txt").exists());
    let again: BTreeSet<_> = validate(root, &exts, false).unwrap().pairs().into_iter().collect();
    assert_eq!(again, found);

    let removed = validate(root, &exts, true).unwrap();
    assert_eq!(removed.removed, 2);
    assert!(!root.join("cats").join("sample.txt").exists());
    assert!(!root.join("dogs").join("sample.jpg").exists());
    assert_eq!(file_names(&root.join("cats")).len(), 7);
    assert!(validate(root, &exts, false).unwrap().is_clean());
}

#[test]
fn validator_catches_image_cut_off_mid_data() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    build_dataset(root);

    let gradient = RgbImage::from_fn(64, 64, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 128]));
    let whole = root.join("cats").join("whole.png");
    gradient.save_with_format(&whole, ImageFormat::Png).unwrap();
    let bytes = fs::read(&whole).unwrap();
    fs::write(root.join("cats").join("half.png"), &bytes[..bytes.len() / 2]).unwrap();

    let report = validate(root, &ValidExtensions::default(), false).unwrap();
    assert_eq!(report.pairs(), vec![("half.png".to_string(), "cats".to_string())]);
}

#[test]
fn copy_split_partitions_each_class_and_keeps_source() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("dataset");
    build_dataset(&root);
    let before = fs::read(root.join("cats").join("cats_3.jpg")).unwrap();

    let train = tmp.path().join("split").join("train");
    let test = tmp.path().join("split").join("test");
    let summary = partition(&root, &train, &test, 0.8).unwrap();

    for (class, total, in_train) in [("cats", 7, 5), ("dogs", 4, 3)] {
        let source = file_names(&root.join(class));
        let train_names = file_names(&train.join(class));
        let test_names = file_names(&test.join(class));
        assert_eq!(source.len(), total);
        assert_eq!(train_names.len(), in_train);
        assert!(train_names.is_disjoint(&test_names));
        assert_eq!(train_names.union(&test_names).cloned().collect::<BTreeSet<_>>(), source);
    }

    assert_eq!(summary.skipped, vec!["empty".to_string()]);
    assert!(!train.join("empty").exists());
    assert!(!test.join("empty").exists());
    assert!(!train.join(".ipynb_checkpoints").exists());
    assert_eq!(fs::read(root.join("cats").join("cats_3.jpg")).unwrap(), before);
}

#[test]
fn move_split_consumes_source() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("dataset");
    build_dataset(&root);
    let original = file_names(&root.join("dogs"));

    let train = tmp.path().join("train");
    let test = tmp.path().join("test");
    let options = PartitionOptions {
        ratio: SplitRatio::new(0.5).unwrap(),
        mode: TransferMode::Move,
        ..PartitionOptions::default()
    };
    let mut rng = StdRng::seed_from_u64(17);
    partition_with_rng(&RealFs, &root, &train, &test, &options, &mut rng).unwrap();

    assert!(file_names(&root.join("dogs")).is_empty());
    assert!(file_names(&root.join("cats")).is_empty());
    let moved: BTreeSet<_> = file_names(&train.join("dogs"))
        .union(&file_names(&test.join("dogs")))
        .cloned()
        .collect();
    assert_eq!(moved, original);
    assert_eq!(file_names(&train.join("cats")).len(), 3);
    assert_eq!(file_names(&test.join("cats")).len(), 4);
}

#[test]
fn split_into_its_own_source_fails_before_touching_files() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("dataset");
    build_dataset(&root);
    let before = fs::read(root.join("cats").join("cats_0.jpg")).unwrap();
    let test = tmp.path().join("test");

    assert!(partition(&root, &root, &test, 0.8).is_err());

    let options = PartitionOptions {
        mode: TransferMode::Move,
        ..PartitionOptions::default()
    };
    let mut rng = StdRng::seed_from_u64(5);
    assert!(partition_with_rng(&RealFs, &root, &test, &root, &options, &mut rng).is_err());

    assert_eq!(file_names(&root.join("cats")).len(), 7);
    assert_eq!(file_names(&root.join("dogs")).len(), 4);
    assert_eq!(fs::read(root.join("cats").join("cats_0.jpg")).unwrap(), before);
    assert!(file_names(&test.join("cats")).is_empty());
}

#[test]
fn split_rejects_out_of_range_ratio() {
    let tmp = tempfile::tempdir().unwrap();
    build_dataset(tmp.path());
    assert!(partition(tmp.path(), &tmp.path().join("tr"), &tmp.path().join("te"), 1.5).is_err());
    assert!(!tmp.path().join("tr").exists());
}
