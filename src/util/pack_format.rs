/// Get the name of the function directory depending on the pack format.
#[must_use]
pub const fn function_directory_name(pack_format: u8) -> &'static str {
    if pack_format < 45 {
        "functions"
    } else {
        "function"
    }
}

/// Get the name of the advancement directory depending on the pack format.
#[must_use]
pub const fn advancement_directory_name(pack_format: u8) -> &'static str {
    if pack_format < 45 {
        "advancements"
    } else {
        "advancement"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_names() {
        assert_eq!(function_directory_name(26), "functions");
        assert_eq!(function_directory_name(61), "function");
        assert_eq!(advancement_directory_name(48), "advancement");
    }
}
