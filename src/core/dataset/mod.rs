mod layout;

pub use layout::{
    default_reserved_names, file_extension, list_class_files, list_classes, ClassDir, SampleFile,
    DEFAULT_RESERVED_NAMES,
};
