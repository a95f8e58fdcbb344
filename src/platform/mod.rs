#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "linux")]
pub use self::linux::SysfsSource as NativeSource;

#[cfg(target_os = "windows")]
pub mod windows;
#[cfg(target_os = "windows")]
pub use self::windows::SetupApiSource as NativeSource;

#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(target_os = "macos")]
pub use self::macos::IoKitSource as NativeSource;

#[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
pub mod not_supported;
#[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
pub use self::not_supported::NotSupportedSource as NativeSource;
