//! Shared WeedCOCO fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::{json, Value};

/// Find the repository root.
pub fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

/// The repository's schema directory.
pub fn schema_dir() -> PathBuf {
    repo_root().join("schemas")
}

/// Empty sections with complete descriptive metadata.
pub fn minimal_weedcoco() -> Value {
    json!({
        "images": [],
        "annotations": [],
        "categories": [],
        "agcontexts": [],
        "info": {
            "description": "Something",
            "metadata": {
                "name": "Something",
                "creator": [{"name": "Someone"}],
                "datePublished": "XXXX-XX-XX",
                "license": "https://creativecommons.org/licenses/by/4.0/"
            }
        }
    })
}

/// Two images, five annotations, two categories, one agcontext.
pub fn small_weedcoco() -> Value {
    serde_json::from_str(SMALL_WEEDCOCO).expect("fixture is valid JSON")
}

const SMALL_WEEDCOCO: &str = r#"{
    "images": [
        {
            "id": 46,
            "file_name": "cwfid_images/046_image.png",
            "license": 0,
            "agcontext_id": 0,
            "width": 1296,
            "height": 966
        },
        {
            "id": 1,
            "file_name": "cwfid_images/001_image.png",
            "license": 0,
            "agcontext_id": 0,
            "width": 1296,
            "height": 966
        }
    ],
    "annotations": [
        {"id": 0, "image_id": 46, "category_id": 0, "segmentation": [[596, 207, 521]], "iscrowd": 0},
        {"id": 1, "image_id": 46, "category_id": 0, "segmentation": [[689, 787, 589, 745]], "iscrowd": 0},
        {"id": 2, "image_id": 46, "category_id": 1, "segmentation": [[486, 335, 399]], "iscrowd": 0},
        {"id": 3, "image_id": 1, "category_id": 1, "segmentation": [[810, 225, 841, 234]], "iscrowd": 0},
        {"id": 4, "image_id": 1, "category_id": 1, "segmentation": [[1070, 626, 1055, 722]], "iscrowd": 0}
    ],
    "categories": [
        {
            "name": "crop: daugus carota",
            "common_name": "carrot",
            "species": "daugus carota",
            "eppo_taxon_code": "DAUCS",
            "eppo_nontaxon_code": "3UMRC",
            "role": "crop",
            "id": 0
        },
        {
            "name": "weed: unspecified",
            "species": "UNSPECIFIED",
            "role": "weed",
            "id": 1
        }
    ],
    "info": {
        "description": "Cwfid annotations converted into WeedCOCO",
        "metadata": {
            "name": "Cwfid annotations converted into WeedCOCO",
            "creator": [{"name": "Sebastian Haug"}],
            "datePublished": "2015-XX-XX",
            "license": "https://github.com/cwfid/dataset"
        }
    },
    "license": [{"id": 0, "url": "https://github.com/cwfid/dataset"}],
    "agcontexts": [
        {
            "id": 0,
            "agcontext_name": "cwfid",
            "crop_type": "other",
            "bbch_growth_range": [10, 20],
            "soil_colour": "grey",
            "surface_cover": "none",
            "surface_coverage": "0-25",
            "weather_description": "sunny",
            "location_lat": 53,
            "location_long": 11,
            "location_datum": 4326,
            "camera_make": "JAI AD-130GE",
            "camera_lens": "Fujinon TF15-DA-8",
            "camera_lens_focallength": 15,
            "camera_height": 450,
            "camera_angle": 90,
            "camera_fov": 22.6,
            "photography_description": "Mounted on boom",
            "lighting": "natural",
            "cropped_to_plant": false
        }
    ]
}"#;

/// Drop the WeedCOCO-only sections and fields, leaving plain COCO.
pub fn to_compatible_coco(weedcoco: &Value) -> Value {
    let mut coco = weedcoco.clone();
    if let Some(root) = coco.as_object_mut() {
        root.remove("agcontexts");
        root.remove("collections");
        root.remove("collection_memberships");
    }
    if let Some(images) = coco["images"].as_array_mut() {
        for image in images {
            if let Some(image) = image.as_object_mut() {
                image.remove("agcontext_id");
            }
        }
    }
    coco
}

/// Copy of `doc` with the first category renamed.
pub fn with_category_name(doc: &Value, name: &str) -> Value {
    let mut doc = doc.clone();
    doc["categories"][0]["name"] = json!(name);
    doc
}

/// Copy of `doc` without the named top-level key.
pub fn without(doc: &Value, key: &str) -> Value {
    let mut doc = doc.clone();
    if let Some(root) = doc.as_object_mut() {
        root.remove(key);
    }
    doc
}
