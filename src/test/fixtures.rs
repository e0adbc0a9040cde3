//! Text fixtures modelled on real tool output.
//!
//! The dumps describe a tiny solution: `App.exe` references `Lib` and `Newtonsoft.Json` 13,
//! `Lib.dll` references `Newtonsoft.Json` 6. Both reference `mscorlib`.

use crate::dependencies::AssemblyTable;
use crate::ildasm::extract_module;

/// `ildasm /text Lib.dll`
pub const LIB_DUMP: &str = r#"
//  Microsoft (R) .NET IL Disassembler.  Version 4.8.3928.0

// Metadata version: v4.0.30319
.assembly extern mscorlib
{
  .publickeytoken = (B7 7A 5C 56 19 34 E0 89 )                         // .z\V.4..
  .ver 4:0:0:0
}
.assembly extern Newtonsoft.Json
{
  .publickeytoken = (30 AD 4F E6 B2 A6 AE ED )                         // 0.O.....
  .ver 6:0:0:0
}
.assembly Lib
{
  .custom instance void [mscorlib]System.Runtime.CompilerServices.CompilationRelaxationsAttribute::.ctor(int32) = ( 01 00 08 00 00 00 00 00 )
  .hash algorithm 0x00008004
  .ver 1:0:0:0
}
.module Lib.dll
// MVID: {4C3A0E2B-7B1D-4F7E-9A0C-2D3C4B5A6978}
.imagebase 0x10000000
.file alignment 0x00000200
.stackreserve 0x00100000
.subsystem 0x0003       // WINDOWS_CUI
.corflags 0x00000001    //  ILONLY
"#;

/// `ildasm /text App.exe`
pub const APP_DUMP: &str = r#"
// Metadata version: v4.0.30319
.assembly extern mscorlib
{
  .publickeytoken = (B7 7A 5C 56 19 34 E0 89 )                         // .z\V.4..
  .ver 4:0:0:0
}
.assembly extern Lib
{
  .ver 1:0:0:0
}
.assembly extern Newtonsoft.Json
{
  .publickeytoken = (30 AD 4F E6 B2 A6 AE ED )                         // 0.O.....
  .ver 13:0:0:0
}
.assembly App
{
  .hash algorithm 0x00008004
  .ver 1:0:0:0
}
.module App.exe
// MVID: {9F8E7D6C-5B4A-3928-1706-F5E4D3C2B1A0}
.imagebase 0x00400000
.subsystem 0x0003       // WINDOWS_CUI
"#;

/// Detailed MSBuild output with one conflict report on `Foo`.
///
/// Group one names `Bar` at 3.0.0.0, group two `Baz` at 3.1.0.0. `Bar` is reached through `Lib`.
pub const BUILD_LOG: &str = r#"Build started 10/19/2026 10:00:00 AM.
Project "C:\src\App\App.csproj" on node 1 (default targets).
PrepareForBuild:
  Creating directory "obj\Debug\".
ResolveAssemblyReferences:
  Primary reference "Bar".
C:\Program Files\MSBuild\Current\Bin\Microsoft.Common.CurrentVersion.targets(2302,5): warning MSB3277: Found conflicts between different versions of "Foo" that could not be resolved. [C:\src\App\App.csproj]
C:\Program Files\MSBuild\Current\Bin\Microsoft.Common.CurrentVersion.targets(2302,5): warning MSB3277: There was a conflict between "Foo, Version=3.0.0.0, Culture=neutral, PublicKeyToken=null" and "Foo, Version=3.1.0.0, Culture=neutral, PublicKeyToken=null". [C:\src\App\App.csproj]
C:\Program Files\MSBuild\Current\Bin\Microsoft.Common.CurrentVersion.targets(2302,5): warning MSB3277:     "Foo, Version=3.0.0.0, Culture=neutral, PublicKeyToken=null" was chosen because it was primary and "Foo, Version=3.1.0.0, Culture=neutral, PublicKeyToken=null" was not. [C:\src\App\App.csproj]
C:\Program Files\MSBuild\Current\Bin\Microsoft.Common.CurrentVersion.targets(2302,5): warning MSB3277:     References which depend on "Foo, Version=3.0.0.0, Culture=neutral, PublicKeyToken=null" [C:\src\packages\Foo.3.0.0\lib\net45\Foo.dll]. [C:\src\App\App.csproj]
C:\Program Files\MSBuild\Current\Bin\Microsoft.Common.CurrentVersion.targets(2302,5): warning MSB3277:         C:\src\Bar\bin\Debug\Bar.dll [C:\src\App\App.csproj]
C:\Program Files\MSBuild\Current\Bin\Microsoft.Common.CurrentVersion.targets(2302,5): warning MSB3277:           Project file item includes which caused reference "C:\src\Bar\bin\Debug\Bar.dll". [C:\src\App\App.csproj]
C:\Program Files\MSBuild\Current\Bin\Microsoft.Common.CurrentVersion.targets(2302,5): warning MSB3277:             C:\src\Lib\bin\Debug\Lib.dll [C:\src\App\App.csproj]
C:\Program Files\MSBuild\Current\Bin\Microsoft.Common.CurrentVersion.targets(2302,5): warning MSB3277:     References which depend on "Foo, Version=3.1.0.0, Culture=neutral, PublicKeyToken=null" [C:\src\packages\Foo.3.1.0\lib\net45\Foo.dll]. [C:\src\App\App.csproj]
C:\Program Files\MSBuild\Current\Bin\Microsoft.Common.CurrentVersion.targets(2302,5): warning MSB3277:         C:\src\Baz\bin\Debug\Baz.dll [C:\src\App\App.csproj]
C:\Program Files\MSBuild\Current\Bin\Microsoft.Common.CurrentVersion.targets(2302,5): warning MSB3277:           Project file item includes which caused reference "C:\src\Baz\bin\Debug\Baz.dll". [C:\src\App\App.csproj]
Done Building Project "C:\src\App\App.csproj" (default targets).
"#;

/// Two consecutive conflict reports, on `Foo` and on `Qux`.
pub const TWO_REPORT_LOG: &str = r#"Project "C:\src\App\App.csproj" on node 1 (default targets).
targets(2302,5): warning MSB3277: Found conflicts between different versions of "Foo" that could not be resolved. [C:\src\App\App.csproj]
targets(2302,5): warning MSB3277:     References which depend on "Foo, Version=3.0.0.0, Culture=neutral, PublicKeyToken=null" []. [C:\src\App\App.csproj]
targets(2302,5): warning MSB3277:         C:\src\Bar\bin\Debug\Bar.dll [C:\src\App\App.csproj]
targets(2302,5): warning MSB3277: Found conflicts between different versions of "Qux" that could not be resolved. [C:\src\App\App.csproj]
targets(2302,5): warning MSB3277:         C:\src\Stray\bin\Debug\Stray.dll [C:\src\App\App.csproj]
targets(2302,5): warning MSB3277:     References which depend on "Qux, Version=2.0.0.0, Culture=neutral, PublicKeyToken=null" []. [C:\src\App\App.csproj]
targets(2302,5): warning MSB3277:         C:\src\Quux\bin\Debug\Quux.dll [C:\src\App\App.csproj]
"#;

/// `App.exe.config` with an exact and a ranged redirect.
pub const APP_CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <runtime>
    <assemblyBinding xmlns="urn:schemas-microsoft-com:asm.v1">
      <dependentAssembly>
        <assemblyIdentity name="Newtonsoft.Json" publicKeyToken="30ad4fe6b2a6aeed" culture="neutral" />
        <bindingRedirect oldVersion="0.0.0.0-13.0.0.0" newVersion="13.0.0.0" />
      </dependentAssembly>
      <dependentAssembly>
        <assemblyIdentity name="Lib" />
        <bindingRedirect oldVersion="1.0.0.0" newVersion="1.2.0.0" />
      </dependentAssembly>
    </assemblyBinding>
  </runtime>
</configuration>
"#;

/// A table merged from [`LIB_DUMP`] and [`APP_DUMP`], in that order.
pub fn sample_table() -> AssemblyTable {
    let mut table = AssemblyTable::new();
    table.merge(&extract_module(LIB_DUMP));
    table.merge(&extract_module(APP_DUMP));
    table
}
