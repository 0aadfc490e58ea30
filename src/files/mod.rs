//! # Resolución de Archivos
//! src/files/mod.rs
//!
//! Mapea el path de un request a un archivo bajo el directorio raíz del
//! servidor. El path se concatena tal cual (`<root><path>`), sin sandboxing:
//! el sistema de archivos se trata como fuente de bytes de solo lectura.
//!
//! ```text
//! root = /srv/www, path = /docs/a.html  →  /srv/www/docs/a.html
//! ```

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errores al resolver un archivo
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No hay nada en esa ruta
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Existe pero no se puede abrir para lectura
    #[error("File not readable: {}", .0.display())]
    Unreadable(PathBuf),

    /// Pasó la verificación de existencia pero la lectura falló
    #[error("Unable to get file contents of {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    /// `true` si corresponde responder 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound(_) | ResolveError::Unreadable(_))
    }
}

/// Resolver de archivos relativo a un directorio raíz
#[derive(Debug, Clone)]
pub struct FileResolver {
    root: PathBuf,
}

impl FileResolver {
    /// Crea un resolver sobre el directorio indicado
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Ruta en disco para un path de request (concatenación directa)
    ///
    /// # Ejemplo
    /// ```
    /// use static_server::files::FileResolver;
    /// use std::path::PathBuf;
    ///
    /// let resolver = FileResolver::new("/srv/www");
    /// assert_eq!(resolver.full_path("/a/b.html"), PathBuf::from("/srv/www/a/b.html"));
    /// ```
    pub fn full_path(&self, request_path: &str) -> PathBuf {
        let mut full = OsString::from(self.root.as_os_str());
        full.push(request_path);
        PathBuf::from(full)
    }

    /// Lee el archivo completo
    ///
    /// Retorna `NotFound`/`Unreadable` si la verificación previa falla, y
    /// `Read` si la verificación pasó pero la lectura no (ej: un directorio).
    pub fn resolve(&self, request_path: &str) -> Result<Vec<u8>, ResolveError> {
        let path = self.full_path(request_path);
        self.check(&path)?;
        fs::read(&path).map_err(|source| ResolveError::Read { path, source })
    }

    fn check(&self, path: &Path) -> Result<(), ResolveError> {
        if !path.exists() {
            return Err(ResolveError::NotFound(path.to_path_buf()));
        }
        match File::open(path) {
            Ok(_) => Ok(()),
            Err(_) => Err(ResolveError::Unreadable(path.to_path_buf())),
        }
    }
}
