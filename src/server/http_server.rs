use may::coroutine::JoinHandle;
use may_minihttp::HttpService;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

/// How long `wait_ready` keeps trying to connect.
const READY_TIMEOUT: Duration = Duration::from_millis(500);

/// Binds an `HttpService` to a socket and runs its accept loop in a coroutine.
pub struct HttpServer<T>(pub T);

/// The running accept loop. Dropping it leaves the server running; use
/// `stop` or `join` to end it.
pub struct ServerHandle {
    addr: SocketAddr,
    listener: JoinHandle<()>,
}

impl ServerHandle {
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until the bound address accepts a TCP connection.
    ///
    /// # Errors
    ///
    /// `TimedOut` if nothing is accepted within `READY_TIMEOUT`.
    pub fn wait_ready(&self) -> io::Result<()> {
        let deadline = Instant::now() + READY_TIMEOUT;
        while Instant::now() < deadline {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("{} did not accept within {READY_TIMEOUT:?}", self.addr),
        ))
    }

    /// Cancel the accept loop and wait for it to unwind.
    pub fn stop(self) {
        // SAFETY: `listener` is the accept-loop coroutine spawned in `start`
        // and is still joinable because `stop` takes the handle by value, so
        // it is cancelled exactly once.
        unsafe { self.listener.coroutine().cancel() };
        // A cancelled coroutine reports a panic on join; that is the expected exit.
        let _ = self.listener.join();
    }

    /// Block the calling thread for as long as the server runs.
    ///
    /// # Errors
    ///
    /// The panic payload if the accept loop panicked.
    pub fn join(self) -> thread::Result<()> {
        self.listener.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind to the first address `addr` resolves to and start accepting.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `addr` resolves to nothing, or the bind error.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
        })?;
        let listener = may_minihttp::HttpServer(self.0).start(addr)?;
        Ok(ServerHandle { addr, listener })
    }
}
