//! Linux positioning source using the GeoClue2 D-Bus service.
//!
//! GeoClue publishes the latest fix as a `Location` object on the client. A
//! worker thread polls that object and forwards each reading to the
//! delegate; a client without a fix yet reports `LocationUnknown`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use zbus::blocking::Connection;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Structure, Value};

use crate::shutdown::{ShutdownHandle, ShutdownReceiver};
use crate::{
    Coordinate, LocationDelegate, LocationError, LocationEvent, LocationResult, LocationSample,
    Permission, PermissionStatus, PositioningSource,
};

const GEOCLUE_BUS: &str = "org.freedesktop.GeoClue2";
const GEOCLUE_MANAGER_PATH: &str = "/org/freedesktop/GeoClue2/Manager";
const GEOCLUE_MANAGER_IFACE: &str = "org.freedesktop.GeoClue2.Manager";
const GEOCLUE_CLIENT_IFACE: &str = "org.freedesktop.GeoClue2.Client";
const GEOCLUE_LOCATION_IFACE: &str = "org.freedesktop.GeoClue2.Location";
const PROPERTIES_IFACE: &str = "org.freedesktop.DBus.Properties";
const DBUS_BUS: &str = "org.freedesktop.DBus";
const DBUS_PATH: &str = "/org/freedesktop/DBus";

/// `GCLUE_ACCURACY_LEVEL_EXACT`
const ACCURACY_LEVEL_EXACT: u32 = 8;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn dbus_error(context: &str, err: impl fmt::Display) -> LocationError {
    LocationError::Unknown(format!("{context}: {err}"))
}

/// GeoClue's `(seconds, microseconds)` timestamp in epoch milliseconds.
const fn epoch_millis(seconds: u64, micros: u64) -> u64 {
    seconds.saturating_mul(1_000).saturating_add(micros / 1_000)
}

/// Positioning source backed by GeoClue2.
pub struct GeoClueSource {
    desktop_id: String,
    poll_interval: Duration,
    delegate: Mutex<Option<Arc<dyn LocationDelegate>>>,
    worker: Mutex<Option<ShutdownHandle>>,
}

impl fmt::Debug for GeoClueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoClueSource")
            .field("desktop_id", &self.desktop_id)
            .field("poll_interval", &self.poll_interval)
            .field("running", &lock(&self.worker).is_some())
            .finish_non_exhaustive()
    }
}

impl Default for GeoClueSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoClueSource {
    /// Create a source that identifies itself as `geotag` and polls once a second.
    #[must_use]
    pub fn new() -> Self {
        Self {
            desktop_id: "geotag".to_owned(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            delegate: Mutex::new(None),
            worker: Mutex::new(None),
        }
    }

    /// Set the desktop id GeoClue uses to look up the app's authorization.
    #[must_use]
    pub fn desktop_id(mut self, desktop_id: impl Into<String>) -> Self {
        self.desktop_id = desktop_id.into();
        self
    }

    /// Set how often the current fix is read.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl PositioningSource for GeoClueSource {
    fn authorization_status(&self) -> PermissionStatus {
        futures::executor::block_on(geotag_permission::check(Permission::Location))
    }

    fn request_authorization(&self) {
        if let Err(err) =
            futures::executor::block_on(geotag_permission::request(Permission::Location))
        {
            warn!("location authorization request failed: {err}");
        }
    }

    fn services_enabled(&self) -> bool {
        let Ok(conn) = Connection::system() else {
            return false;
        };

        let has_owner: bool = conn
            .call_method(
                Some(DBUS_BUS),
                DBUS_PATH,
                Some(DBUS_BUS),
                "NameHasOwner",
                &(GEOCLUE_BUS,),
            )
            .and_then(|reply| reply.body().deserialize())
            .unwrap_or(false);
        if has_owner {
            return true;
        }

        // GeoClue is usually D-Bus activated on first use.
        let activatable: Vec<String> = conn
            .call_method(
                Some(DBUS_BUS),
                DBUS_PATH,
                Some(DBUS_BUS),
                "ListActivatableNames",
                &(),
            )
            .and_then(|reply| reply.body().deserialize())
            .unwrap_or_default();
        activatable.iter().any(|name| name == GEOCLUE_BUS)
    }

    fn set_delegate(&self, delegate: Arc<dyn LocationDelegate>) {
        *lock(&self.delegate) = Some(delegate);
    }

    fn start_updates(&self) -> LocationResult<()> {
        let mut worker = lock(&self.worker);
        if worker.is_some() {
            return Ok(());
        }

        let delegate = lock(&self.delegate)
            .clone()
            .ok_or(LocationError::DelegateMissing)?;
        let client = GeoClueClient::connect(&self.desktop_id)?;
        let (handle, receiver) = ShutdownHandle::new();
        let interval = self.poll_interval;

        thread::Builder::new()
            .name("geoclue-poll".to_owned())
            .spawn(move || poll_loop(&client, delegate.as_ref(), &receiver, interval))
            .map_err(|e| dbus_error("failed to spawn GeoClue worker", e))?;

        *worker = Some(handle);
        Ok(())
    }

    fn stop_updates(&self) {
        if let Some(handle) = lock(&self.worker).take() {
            handle.shutdown();
        }
    }
}

fn poll_loop(
    client: &GeoClueClient,
    delegate: &dyn LocationDelegate,
    shutdown: &ShutdownReceiver,
    interval: Duration,
) {
    while !shutdown.is_shutdown() {
        match client.read_sample() {
            Ok(sample) => delegate.on_event(LocationEvent::Sample(sample)),
            Err(err) => delegate.on_event(LocationEvent::Error(err)),
        }
        if shutdown.wait_timeout(interval) {
            break;
        }
    }
    client.stop();
    debug!("GeoClue worker finished");
}

/// A started GeoClue2 client on the system bus.
struct GeoClueClient {
    connection: Connection,
    path: OwnedObjectPath,
}

impl GeoClueClient {
    fn connect(desktop_id: &str) -> LocationResult<Self> {
        let connection =
            Connection::system().map_err(|e| dbus_error("D-Bus connection failed", e))?;

        let path: OwnedObjectPath = connection
            .call_method(
                Some(GEOCLUE_BUS),
                GEOCLUE_MANAGER_PATH,
                Some(GEOCLUE_MANAGER_IFACE),
                "GetClient",
                &(),
            )
            .map_err(|_| LocationError::ServiceDisabled)?
            .body()
            .deserialize()
            .map_err(|e| dbus_error("failed to parse GetClient reply", e))?;

        let client = Self { connection, path };
        client.set_property("DesktopId", Value::from(desktop_id))?;
        client.set_property("RequestedAccuracyLevel", Value::from(ACCURACY_LEVEL_EXACT))?;

        client
            .connection
            .call_method(
                Some(GEOCLUE_BUS),
                client.path.as_str(),
                Some(GEOCLUE_CLIENT_IFACE),
                "Start",
                &(),
            )
            .map_err(|e| match e {
                zbus::Error::MethodError(..) => LocationError::PermissionDenied,
                other => dbus_error("failed to start GeoClue client", other),
            })?;

        Ok(client)
    }

    fn set_property(&self, name: &str, value: Value<'_>) -> LocationResult<()> {
        self.connection
            .call_method(
                Some(GEOCLUE_BUS),
                self.path.as_str(),
                Some(PROPERTIES_IFACE),
                "Set",
                &(GEOCLUE_CLIENT_IFACE, name, value),
            )
            .map_err(|e| dbus_error(&format!("failed to set {name}"), e))?;
        Ok(())
    }

    fn get_property(&self, path: &str, iface: &str, name: &str) -> LocationResult<OwnedValue> {
        self.connection
            .call_method(
                Some(GEOCLUE_BUS),
                path,
                Some(PROPERTIES_IFACE),
                "Get",
                &(iface, name),
            )
            .map_err(|e| dbus_error(&format!("failed to get {name}"), e))?
            .body()
            .deserialize()
            .map_err(|e| dbus_error(&format!("failed to parse {name}"), e))
    }

    fn read_f64(&self, path: &str, name: &str) -> LocationResult<f64> {
        let value = self.get_property(path, GEOCLUE_LOCATION_IFACE, name)?;
        f64::try_from(value).map_err(|e| dbus_error(&format!("invalid {name}"), e))
    }

    fn read_sample(&self) -> LocationResult<LocationSample> {
        let value = self.get_property(self.path.as_str(), GEOCLUE_CLIENT_IFACE, "Location")?;
        let location = OwnedObjectPath::try_from(value)
            .map_err(|e| dbus_error("invalid Location path", e))?;

        // GeoClue keeps the root path until it has a first fix.
        if location.as_str() == "/" {
            return Err(LocationError::LocationUnknown);
        }

        let latitude = self.read_f64(location.as_str(), "Latitude")?;
        let longitude = self.read_f64(location.as_str(), "Longitude")?;
        let accuracy = self.read_f64(location.as_str(), "Accuracy")?;
        let timestamp = self.read_timestamp(location.as_str())?;

        Ok(LocationSample::new(
            Coordinate::new(latitude, longitude),
            accuracy,
            timestamp,
        ))
    }

    /// When GeoClue measured the location, as Unix epoch milliseconds.
    fn read_timestamp(&self, path: &str) -> LocationResult<u64> {
        let value = self.get_property(path, GEOCLUE_LOCATION_IFACE, "Timestamp")?;
        let fields =
            Structure::try_from(value).map_err(|e| dbus_error("invalid Timestamp", e))?;
        let (seconds, micros) =
            <(u64, u64)>::try_from(fields).map_err(|e| dbus_error("invalid Timestamp", e))?;
        Ok(epoch_millis(seconds, micros))
    }

    fn stop(&self) {
        if let Err(err) = self.connection.call_method(
            Some(GEOCLUE_BUS),
            self.path.as_str(),
            Some(GEOCLUE_CLIENT_IFACE),
            "Stop",
            &(),
        ) {
            warn!("failed to stop GeoClue client: {err}");
        }
    }
}
