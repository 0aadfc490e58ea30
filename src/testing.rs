//! Utilidades compartidas por los tests unitarios y de integración.

use std::fs;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

static NEXT_ROOT: AtomicUsize = AtomicUsize::new(0);

/// Directorio raíz temporal con nombre único; se borra al hacer drop
pub struct TempRoot {
    path: PathBuf,
}

impl TempRoot {
    pub fn new(label: &str) -> Self {
        let id = NEXT_ROOT.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "static_server-{}-{}-{}",
            label,
            std::process::id(),
            id
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("create temp root");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Escribe un archivo relativo a la raíz, creando los directorios intermedios
    pub fn write(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let file = self.path.join(relative);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&file, contents).expect("write test file");
        file
    }
}

impl Drop for TempRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Envía bytes crudos y lee la respuesta hasta que el servidor cierra
pub fn send_raw(addr: SocketAddr, raw: &[u8]) -> io::Result<Vec<u8>> {
    let mut stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(Some(Duration::from_secs(10)))?;
    stream.set_write_timeout(Some(Duration::from_secs(10)))?;

    stream.write_all(raw)?;
    stream.flush()?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response)?;
    Ok(response)
}

/// Separa una respuesta en (bloque de headers, body)
pub fn split_response(response: &[u8]) -> (String, Vec<u8>) {
    match response.windows(4).position(|w| w == b"\r\n\r\n") {
        Some(pos) => (
            String::from_utf8_lossy(&response[..pos + 4]).into_owned(),
            response[pos + 4..].to_vec(),
        ),
        None => (String::from_utf8_lossy(response).into_owned(), Vec::new()),
    }
}

/// Busca el valor de un header en un bloque de headers crudo
pub fn header_value<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    let prefix = format!("{}: ", name);
    head.split("\r\n")
        .find_map(|line| line.strip_prefix(prefix.as_str()))
}
