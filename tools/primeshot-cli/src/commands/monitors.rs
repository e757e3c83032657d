//! List connected monitors.

use primeshot_platform_core::primary_monitor;

pub fn run() -> anyhow::Result<()> {
    let support = primeshot_platform_windows::probe_graphics_capture_support();
    println!("primeshot monitor check");
    println!("{}", "=".repeat(50));
    if support.available {
        println!("[OK] Windows.Graphics.Capture is available");
    } else {
        println!("[WARN] Windows.Graphics.Capture is not available");
    }

    let monitors = primeshot_platform_windows::detect_monitors()?;
    println!("[OK] Monitors detected: {}", monitors.len());
    for m in &monitors {
        println!(
            "     {} {}x{} at ({}, {}) {}",
            m.name,
            m.width,
            m.height,
            m.x,
            m.y,
            if m.primary { "(primary)" } else { "" }
        );
    }

    match primary_monitor(&monitors) {
        Some(m) => println!("\nCapture target: {} ({}x{})", m.name, m.width, m.height),
        None => println!("\nNo primary monitor found."),
    }
    Ok(())
}
