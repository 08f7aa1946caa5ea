// tests/pipeline_tests.rs
use std::fs;
use std::path::{Path, PathBuf};

use gdal::raster::{Buffer, GdalType};
use gdal::DriverManager;
use regionprops_table::batch::{process_batch, BatchConfig};
use regionprops_table::error::{MeasureError, ReadError};
use regionprops_table::io::{pair_files, read_intensity, read_labels, FileTriple, Pairing};
use regionprops_table::processing::{run_job, BatchProcessor, Job, MeasureRequest, Property, PropertySet};
use tempfile::TempDir;

/// Helper function to write a GeoTIFF with one or more bands
fn write_tiff<T: GdalType + Copy>(path: &Path, width: usize, height: usize, bands: &[Vec<T>]) {
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver
        .create_with_band_type::<T, _>(path, width, height, bands.len())
        .unwrap();
    for (i, data) in bands.iter().enumerate() {
        let mut band = dataset.rasterband(i + 1).unwrap();
        let mut buffer = Buffer::new((width, height), data.clone());
        band.write((0, 0), (width, height), &mut buffer).unwrap();
    }
    dataset.flush_cache().unwrap();
}

/// 3x4 label image with labels 1, 2 and 3
fn write_three_labels(path: &Path) {
    #[rustfmt::skip]
    let labels: Vec<u16> = vec![
        1, 1, 0, 2,
        1, 0, 0, 2,
        0, 3, 3, 3,
    ];
    write_tiff(path, 4, 3, &[labels]);
}

fn request(properties: &[Property]) -> MeasureRequest {
    MeasureRequest {
        properties: PropertySet::new(properties.iter().copied()),
        ..MeasureRequest::default()
    }
}

fn job(labels: PathBuf, regions: PathBuf, request: MeasureRequest) -> Job {
    Job {
        labels,
        regions,
        images: None,
        pairing: Pairing::Alphabetical,
        request,
    }
}

/// Reads a CSV into a header and rows of raw fields
fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|record| record.unwrap().iter().map(String::from).collect())
        .collect();
    (header, rows)
}

#[test]
fn test_read_labels_from_tiff() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("labels.tif");
    write_three_labels(&path);

    let labels = read_labels(&path).unwrap();

    assert_eq!(labels.shape(), [3, 4]);
    assert_eq!(&labels.values()[..4], [1i64, 1, 0, 2]);
    assert_eq!(labels.regions().keys().copied().collect::<Vec<_>>(), [1, 2, 3]);
}

#[test]
fn test_float_labels_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("float.tif");
    write_tiff::<f32>(&path, 2, 2, &[vec![1.0, 0.0, 2.0, 2.0]]);

    let err = read_labels(&path).unwrap_err();

    assert!(matches!(err, ReadError::NonIntegerLabels(_)));
}

#[test]
fn test_large_int64_labels_stay_distinct() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("wide.tif");
    let big = 1i64 << 53;
    write_tiff::<i64>(&path, 2, 1, &[vec![big, big + 1]]);

    let labels = read_labels(&path).unwrap();

    assert_eq!(labels.values(), [big, big + 1]);
    assert_eq!(labels.regions().len(), 2);
}

#[test]
fn test_integer_intensity_extremes_written_without_decimal_point() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels.tif");
    let image = tmp.path().join("image.tif");
    let regions = tmp.path().join("regions.csv");
    write_tiff::<u8>(&labels, 2, 1, &[vec![1, 1]]);
    write_tiff::<u16>(&image, 2, 1, &[vec![7, 9]]);

    let processor = BatchProcessor::new(request(&[
        Property::IntensityMin,
        Property::IntensityMax,
        Property::IntensityMean,
    ]));
    let triple = FileTriple {
        labels,
        image: Some(image),
        regions: regions.clone(),
    };
    processor.process(&[triple]).unwrap();

    let (header, rows) = read_csv(&regions);
    assert_eq!(header, ["label", "intensity_min", "intensity_max", "intensity_mean"]);
    assert_eq!(rows, [["1", "7", "9", "8.0"]]);
}

#[test]
fn test_multiband_labels_are_3d() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("stack.tif");
    write_tiff::<u8>(&path, 2, 2, &[vec![1, 0, 0, 0], vec![1, 2, 0, 0]]);

    let labels = read_labels(&path).unwrap();

    assert_eq!(labels.shape(), [2, 2, 2]);
    assert_eq!(labels.regions()[&1], vec![0, 4]);
}

#[test]
fn test_multiband_intensity_over_2d_labels_is_multichannel() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("rgb.tif");
    write_tiff::<u8>(&path, 2, 1, &[vec![10, 11], vec![20, 21], vec![30, 31]]);

    let image = read_intensity(&path, &[1, 2]).unwrap();

    assert_eq!(image.shape(), [1, 2, 3]);
    assert_eq!(image.values(), [10.0, 20.0, 30.0, 11.0, 21.0, 31.0]);
    assert_eq!(image.channels_for(&[1, 2]).unwrap(), Some(3));
}

#[test]
fn test_three_labels_give_three_rows_with_and_without_cache() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels.tif");
    write_three_labels(&labels);

    let properties = [Property::Area, Property::Centroid, Property::Eccentricity];
    let mut outputs = Vec::new();
    for cache in [true, false] {
        let regions = tmp.path().join(format!("cache_{cache}.csv"));
        let processor = BatchProcessor::new(MeasureRequest {
            cache,
            ..request(&properties)
        });
        let triple = FileTriple {
            labels: labels.clone(),
            image: None,
            regions: regions.clone(),
        };
        processor.process(&[triple]).unwrap();
        outputs.push(regions);
    }

    let (header, rows) = read_csv(&outputs[0]);
    assert_eq!(header, ["label", "area", "centroid-0", "centroid-1", "eccentricity"]);
    assert_eq!(rows.len(), 3);
    let index: Vec<&str> = rows.iter().map(|row| row[0].as_str()).collect();
    assert_eq!(index, ["1", "2", "3"]);
    assert_eq!(rows[0][1], "3.0");
    assert_eq!(rows[2][2], "2.0");

    let cached = fs::read_to_string(&outputs[0]).unwrap();
    let uncached = fs::read_to_string(&outputs[1]).unwrap();
    assert_eq!(cached, uncached);
}

#[test]
fn test_label_column_present_when_not_requested() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels.tif");
    let regions = tmp.path().join("regions.csv");
    write_three_labels(&labels);
    // Output arguments must exist, like input arguments
    fs::write(&regions, "").unwrap();

    let written = run_job(&job(labels, regions.clone(), request(&[Property::Area]))).unwrap();

    // A single label file resolves to a single output, with the .csv suffix
    assert_eq!(written, [regions.clone()]);
    let (header, _) = read_csv(&regions);
    assert_eq!(header, ["label", "area"]);
}

#[test]
fn test_directory_of_labels_writes_one_csv_each() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels");
    let regions = tmp.path().join("regions");
    fs::create_dir_all(&labels).unwrap();
    fs::create_dir_all(&regions).unwrap();
    for name in ["a.tif", "b.tif", "c.tif"] {
        write_three_labels(&labels.join(name));
    }

    let written = run_job(&job(labels, regions.clone(), MeasureRequest::default())).unwrap();

    assert_eq!(
        written,
        [regions.join("a.csv"), regions.join("b.csv"), regions.join("c.csv")]
    );
    for path in &written {
        let (header, rows) = read_csv(path);
        assert_eq!(header, ["label", "bbox-0", "bbox-1", "bbox-2", "bbox-3"]);
        assert_eq!(rows.len(), 3);
    }
}

#[test]
fn test_images_paired_by_name() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels");
    let images = tmp.path().join("images");
    let regions = tmp.path().join("regions");
    for dir in [&labels, &images, &regions] {
        fs::create_dir_all(dir).unwrap();
    }
    write_three_labels(&labels.join("sample.tif"));
    write_tiff::<u16>(&images.join("sample.tif"), 4, 3, &[vec![7; 12]]);
    // Sorts before sample.tif, so only by-name pairing finds the right image
    write_tiff::<u16>(&images.join("another.tif"), 2, 2, &[vec![0; 4]]);

    let written = run_job(&Job {
        labels,
        regions: regions.clone(),
        images: Some(images),
        pairing: Pairing::ByName,
        request: request(&[Property::IntensityMean]),
    })
    .unwrap();

    assert_eq!(written, [regions.join("sample.csv")]);
    let (header, rows) = read_csv(&written[0]);
    assert_eq!(header, ["label", "intensity_mean"]);
    assert!(rows.iter().all(|row| row[1] == "7.0"));
}

#[test]
fn test_image_count_mismatch_is_reported_before_reading() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels");
    let images = tmp.path().join("images");
    let regions = tmp.path().join("regions");
    for dir in [&labels, &images, &regions] {
        fs::create_dir_all(dir).unwrap();
    }
    fs::write(labels.join("a.tif"), b"not a tiff").unwrap();
    fs::write(images.join("a.tif"), b"").unwrap();
    fs::write(images.join("b.tif"), b"").unwrap();

    let err = pair_files(&labels, &regions, Some(&images), Pairing::Alphabetical).unwrap_err();

    assert!(err.to_string().contains("does not match"));
}

#[test]
fn test_wrong_spacing_arity_aborts() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels.tif");
    let regions = tmp.path().join("regions.csv");
    write_three_labels(&labels);
    fs::write(&regions, "").unwrap();

    let err = run_job(&job(
        labels,
        regions.clone(),
        MeasureRequest {
            spacing: Some(vec![0.5]),
            ..request(&[Property::Area])
        },
    ))
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MeasureError>(),
        Some(MeasureError::SpacingMismatch { expected: 2, got: 1 })
    ));
    assert_eq!(fs::read_to_string(&regions).unwrap(), "");
}

#[test]
fn test_unreadable_label_file_aborts_batch() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels");
    let regions = tmp.path().join("regions");
    fs::create_dir_all(&labels).unwrap();
    fs::create_dir_all(&regions).unwrap();
    write_three_labels(&labels.join("a.tif"));
    fs::write(labels.join("b.tif"), b"not a tiff").unwrap();
    write_three_labels(&labels.join("c.tif"));

    let err = run_job(&job(labels, regions.clone(), MeasureRequest::default())).unwrap_err();

    assert!(format!("{err:#}").contains("b.tif"));
    assert!(regions.join("a.csv").exists());
    assert!(!regions.join("c.csv").exists());
}

#[test]
fn test_batch_config_overrides_global_params() {
    let config: BatchConfig = serde_json::from_str(
        r#"{
            "global": { "properties": ["area"], "spacing": [2.0, 2.0] },
            "jobs": [
                { "labels": "in/a.tif", "regions": "out" },
                { "labels": "/abs/b.tif", "regions": "out", "properties": ["centroid"],
                  "cache": false, "separator": "_", "by_name": true, "images": "img" }
            ]
        }"#,
    )
    .unwrap();

    let jobs = config.jobs(Path::new("/base")).unwrap();

    assert_eq!(jobs[0].labels, Path::new("/base/in/a.tif"));
    assert_eq!(jobs[0].request.properties.as_slice(), [Property::Label, Property::Area]);
    assert_eq!(jobs[0].request.spacing, Some(vec![2.0, 2.0]));
    assert!(jobs[0].request.cache);
    assert_eq!(jobs[0].request.separator, "-");
    assert_eq!(jobs[0].pairing, Pairing::Alphabetical);

    assert_eq!(jobs[1].labels, Path::new("/abs/b.tif"));
    assert_eq!(jobs[1].images.as_deref(), Some(Path::new("/base/img")));
    assert_eq!(jobs[1].request.properties.as_slice(), [Property::Label, Property::Centroid]);
    assert!(!jobs[1].request.cache);
    assert_eq!(jobs[1].request.separator, "_");
    assert_eq!(jobs[1].pairing, Pairing::ByName);
}

#[test]
fn test_batch_config_rejects_unknown_property() {
    let config: BatchConfig = serde_json::from_str(
        r#"{ "jobs": [ { "labels": "a.tif", "regions": "out", "properties": ["roundness"] } ] }"#,
    )
    .unwrap();

    let err = config.jobs(Path::new(".")).unwrap_err();

    assert!(format!("{err:#}").contains("roundness"));
}

#[test]
fn test_batch_config_rejects_unknown_keys() {
    let result = serde_json::from_str::<BatchConfig>(r#"{ "jobs": [], "operations": [] }"#);
    assert!(result.is_err());
}

#[test]
fn test_process_batch_end_to_end() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("labels")).unwrap();
    fs::create_dir_all(tmp.path().join("out")).unwrap();
    write_three_labels(&tmp.path().join("labels/x.tif"));
    let config_path = tmp.path().join("batch.json");
    fs::write(
        &config_path,
        r#"{ "jobs": [ { "labels": "labels", "regions": "out", "properties": ["num_pixels"] } ] }"#,
    )
    .unwrap();

    let written = process_batch(&config_path).unwrap();

    assert_eq!(written, [tmp.path().join("out/x.csv")]);
    let (header, rows) = read_csv(&written[0]);
    assert_eq!(header, ["label", "num_pixels"]);
    let counts: Vec<&str> = rows.iter().map(|row| row[1].as_str()).collect();
    assert_eq!(counts, ["3", "2", "3"]);
}
