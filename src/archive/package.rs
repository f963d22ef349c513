use crate::archive::ArchiveError;
use crate::{GrabError, PrecheckError};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

/// Checks that the data package exists before anything else touches it
pub fn ensure_package_exists(package: &Path) -> Result<(), PrecheckError> {
    if package.is_file() {
        Ok(())
    } else {
        Err(PrecheckError::PackageMissing(package.to_path_buf()))
    }
}

/// Reads one member of the zipped data package as UTF-8 text
///
/// # Arguments
///
/// * `package` - Path to the zip file
/// * `member` - Name of the member inside the archive (e.g. `account/user.json`)
///
/// # Returns
///
/// * `Ok(String)` - The member's content
/// * `Err(GrabError::Precheck)` - The package or the member is missing
/// * `Err(GrabError::Archive)` - The package could not be opened or decoded
pub fn read_member(package: &Path, member: &str) -> Result<String, GrabError> {
    ensure_package_exists(package)?;

    let file = File::open(package).map_err(|source| ArchiveError::Io {
        path: package.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|source| ArchiveError::Zip {
        path: package.to_path_buf(),
        source,
    })?;

    let mut entry = match archive.by_name(member) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(PrecheckError::MemberMissing {
                member: member.to_string(),
                package: package.to_path_buf(),
            }
            .into());
        }
        Err(source) => {
            return Err(ArchiveError::Zip {
                path: package.to_path_buf(),
                source,
            }
            .into());
        }
    };

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|source| ArchiveError::Io {
            path: package.join(member),
            source,
        })?;

    tracing::debug!(
        "Read {} bytes from {} in {}",
        content.len(),
        member,
        package.display()
    );

    Ok(content)
}
