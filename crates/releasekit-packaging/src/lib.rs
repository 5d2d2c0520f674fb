//! Packaging tasks and the tool backends they drive.

pub mod android;
pub mod appimage;
pub mod context;
pub mod dotnet;
pub mod library;
pub mod linux;
mod process;
pub mod task;
pub mod windows;

#[cfg(test)]
mod testing;

pub use android::{AndroidPackage, AndroidSigning};
pub use appimage::AppImageTool;
pub use context::BuildContext;
pub use dotnet::DotnetCli;
pub use library::{LibraryPackage, PackageFeed};
pub use linux::LinuxAppImage;
pub use task::PackagingTask;
pub use windows::WindowsExecutable;
