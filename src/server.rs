use std::io::{self, BufReader};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use crate::args::Args;
use crate::compression::CompressionType;
use crate::config::Config;
use crate::file_serving::handlers::handle_request;
use crate::file_serving::response::Response;
use crate::file_serving::writer::write_response;
use crate::log_error;
use crate::request::Request;
use crate::status::StatusCode;

pub fn start_server(args: Args) -> io::Result<()> {
    let config = Config::try_from(&args)?;
    let listener = TcpListener::bind(&args.listen_addr)?;
    println!("Listening on: http://{}", listener.local_addr()?);
    println!("Serving directory: {}", config.root.display());

    serve(listener, Arc::new(config))
}

/// Accept loop; one thread per connection.
pub fn serve(listener: TcpListener, config: Arc<Config>) -> io::Result<()> {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                log_error!(e, "Failed to accept connection");
                continue;
            }
        };
        let config = Arc::clone(&config);

        thread::spawn(move || {
            if let Err(e) = handle_connection(stream, &config) {
                log_error!(e, "Error handling connection");
            }
        });
    }

    Ok(())
}

/// Serves a single request, then drops the connection.
fn handle_connection(client: TcpStream, config: &Config) -> io::Result<()> {
    log::debug!("New connection from {}", client.peer_addr()?);

    // Separate handle for the response; both close when this returns
    let mut writer = client.try_clone()?;
    let mut buf_reader = BufReader::new(client);

    match Request::read_from(&mut buf_reader) {
        Ok(Some(request)) => {
            handle_request(config, &request, &mut writer);
            Ok(())
        }
        Ok(None) => {
            log::debug!("Connection closed before a request arrived");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            log::warn!("Rejecting request: {}", e);
            let response = Response::for_status(StatusCode::BadRequest, None);
            write_response(
                &mut writer,
                response,
                CompressionType::None,
                &config.compression,
            )?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}
